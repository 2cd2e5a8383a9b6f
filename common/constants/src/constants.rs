/// Fixed-point denominator of every rate, accumulator and scaled percentage.
pub const SCALE: u128 = 1_000_000_000_000_000_000_000_000_000;
pub const SCALE_PRECISION: u32 = 27;

/// Width of the signed integer domain the contract computes in. Unsigned
/// results must stay below `2^257`.
pub const MAX_UINT_257_BITS: u64 = 257;

/// 365-day year, not leap adjusted.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

pub const PERCENT_100: u8 = 100;

/// Oracle prices are always quoted with 8 decimals.
pub const PRICE_DECIMALS: u32 = 8;

// Cell limits
pub const MAX_CELL_BITS: usize = 1023;
pub const MAX_CELL_REFS: usize = 4;

// Field widths shared by the reserve, user and event layouts
pub const RESERVE_ID_BITS: usize = 6;
pub const ENABLED_FLAG_BITS: usize = 2;
pub const PERCENT_BITS: usize = 8;
pub const DECIMALS_BITS: usize = 8;
pub const TIMESTAMP_BITS: usize = 64;
pub const RESERVE_ACCUMULATOR_BITS: usize = 100;
pub const EVENT_ACCUMULATOR_BITS: usize = 105;
pub const RATE_BITS: usize = 128;
pub const AMOUNT_BITS: usize = 256;
pub const RAW_BALANCE_BITS: usize = 128;
pub const PRICE_BITS: usize = 128;
pub const LOCK_ID_BITS: usize = 10;
pub const LOCK_STATE_BITS: usize = 2;
pub const VERSION_BITS: usize = 14;
pub const VARIANT_BITS: usize = 4;
pub const EVENT_OP_BITS: usize = 6;
pub const MESSAGE_OP_BITS: usize = 32;
pub const QUERY_ID_BITS: usize = 64;
pub const FORWARD_PREFIX_BITS: usize = 3;

// Tx lock states
pub const LOCK_UNLOCKED: u8 = 1;
pub const LOCK_LOCKED: u8 = 2;

// Event op-codes
pub const EVENT_DEPOSIT: u8 = 0;
pub const EVENT_WITHDRAWAL: u8 = 1;
pub const EVENT_BORROWING: u8 = 2;
pub const EVENT_REPAYMENT: u8 = 3;
pub const EVENT_LIQUIDATION: u8 = 4;

// Inbound message op-codes
pub const OP_WITHDRAW_FROM_WALLET_TO_MASTER: u32 = 1050;
pub const OP_BORROW_FROM_WALLET_TO_MASTER: u32 = 1090;
pub const OP_JETTON_TRANSFER: u32 = 0x0f8a_7ea5;

// Jetton forward payload constructor prefixes
pub const FORWARD_DEPOSIT: u8 = 0b000;
pub const FORWARD_REPAY: u8 = 0b001;
pub const FORWARD_LIQUIDATE: u8 = 0b010;

/// Workchain every derived protocol address lives in.
pub const BASECHAIN: i8 = 0;
