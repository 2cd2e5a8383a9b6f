//! Protocol event log records.
//!
//! Every event body is `op:6 ^common ^event ^empty`, where `common` holds
//! three references (headers, accumulators, rates and totals). Liquidations
//! nest their body one level deeper, so the op-code is always checked before
//! the body is read.

use common_cells::{Address, Builder, Cell, CellError, CellPack, CellUnpack, FormatError, Slice};
use common_constants::{
    AMOUNT_BITS, EVENT_ACCUMULATOR_BITS, EVENT_BORROWING, EVENT_DEPOSIT, EVENT_LIQUIDATION,
    EVENT_OP_BITS, EVENT_REPAYMENT, EVENT_WITHDRAWAL, RATE_BITS, RESERVE_ID_BITS, TIMESTAMP_BITS,
    VERSION_BITS,
};
use common_structs::ReserveState;
use num_bigint::BigUint;

const NON_LIQUIDATION_OPS: &str = "0, 1, 2 or 3";
const LIQUIDATION_OP: &str = "4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Deposit,
    Withdrawal,
    Borrowing,
    Repayment,
}

impl ActionKind {
    pub fn op(self) -> u8 {
        match self {
            ActionKind::Deposit => EVENT_DEPOSIT,
            ActionKind::Withdrawal => EVENT_WITHDRAWAL,
            ActionKind::Borrowing => EVENT_BORROWING,
            ActionKind::Repayment => EVENT_REPAYMENT,
        }
    }
}

impl TryFrom<u8> for ActionKind {
    type Error = FormatError;

    fn try_from(op: u8) -> Result<Self, Self::Error> {
        match op {
            EVENT_DEPOSIT => Ok(ActionKind::Deposit),
            EVENT_WITHDRAWAL => Ok(ActionKind::Withdrawal),
            EVENT_BORROWING => Ok(ActionKind::Borrowing),
            EVENT_REPAYMENT => Ok(ActionKind::Repayment),
            found => Err(FormatError::UnexpectedOpcode {
                found,
                expected: NON_LIQUIDATION_OPS,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeaders {
    pub system_version: u16,
    pub user_version: u16,
    /// For liquidations, the reserve the debt was repaid in.
    pub reserve_id: u8,
}

/// Reserve state right after the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub last_update_timestamp: u64,
    pub lending_accumulator: BigUint,
    pub debt_accumulator: BigUint,
    pub total_raw_amount_to_treasury: BigUint,
    pub lending_rate: BigUint,
    pub borrowing_rate: BigUint,
    pub total_raw_available: BigUint,
    pub total_raw_debt: BigUint,
}

impl ReserveSnapshot {
    /// Returns `reserve` brought up to this snapshot. Config and rate model
    /// are not part of an event and stay as they are.
    pub fn apply_to(&self, reserve: &ReserveState) -> ReserveState {
        let mut updated = reserve.clone();
        let accumulators = &mut updated.accumulators;
        accumulators.last_update_timestamp = self.last_update_timestamp;
        accumulators.lending_accumulator = self.lending_accumulator.clone();
        accumulators.debt_accumulator = self.debt_accumulator.clone();
        accumulators.current_lending_rate = self.lending_rate.clone();
        accumulators.current_borrowing_rate = self.borrowing_rate.clone();
        accumulators.total_raw_amount_to_treasury = self.total_raw_amount_to_treasury.clone();
        updated.totals.total_raw_available = self.total_raw_available.clone();
        updated.totals.total_raw_debt = self.total_raw_debt.clone();
        updated
    }
}

fn pack_common(headers: &EventHeaders, snapshot: &ReserveSnapshot) -> Result<Cell, CellError> {
    let headers = Builder::new()
        .store_u64(headers.system_version.into(), VERSION_BITS)?
        .store_u64(headers.user_version.into(), VERSION_BITS)?
        .store_u64(headers.reserve_id.into(), RESERVE_ID_BITS)?
        .build()?;
    let accumulators = Builder::new()
        .store_u64(snapshot.last_update_timestamp, TIMESTAMP_BITS)?
        .store_uint(&snapshot.lending_accumulator, EVENT_ACCUMULATOR_BITS)?
        .store_uint(&snapshot.debt_accumulator, EVENT_ACCUMULATOR_BITS)?
        .store_uint(&snapshot.total_raw_amount_to_treasury, AMOUNT_BITS)?
        .build()?;
    let rates_and_totals = Builder::new()
        .store_uint(&snapshot.lending_rate, RATE_BITS)?
        .store_uint(&snapshot.borrowing_rate, RATE_BITS)?
        .store_uint(&snapshot.total_raw_available, AMOUNT_BITS)?
        .store_uint(&snapshot.total_raw_debt, AMOUNT_BITS)?
        .build()?;

    Builder::new()
        .store_ref(headers)?
        .store_ref(accumulators)?
        .store_ref(rates_and_totals)?
        .build()
}

fn unpack_common(cell: &Cell) -> Result<(EventHeaders, ReserveSnapshot), FormatError> {
    let mut common = cell.parse();

    let mut slice = common.load_ref()?.parse();
    let headers = EventHeaders {
        system_version: slice.load_u64(VERSION_BITS)? as u16,
        user_version: slice.load_u64(VERSION_BITS)? as u16,
        reserve_id: slice.load_u64(RESERVE_ID_BITS)? as u8,
    };
    slice.end_parse()?;

    let mut slice = common.load_ref()?.parse();
    let last_update_timestamp = slice.load_u64(TIMESTAMP_BITS)?;
    let lending_accumulator = slice.load_uint(EVENT_ACCUMULATOR_BITS)?;
    let debt_accumulator = slice.load_uint(EVENT_ACCUMULATOR_BITS)?;
    let total_raw_amount_to_treasury = slice.load_uint(AMOUNT_BITS)?;
    slice.end_parse()?;

    let mut slice = common.load_ref()?.parse();
    let snapshot = ReserveSnapshot {
        last_update_timestamp,
        lending_accumulator,
        debt_accumulator,
        total_raw_amount_to_treasury,
        lending_rate: slice.load_uint(RATE_BITS)?,
        borrowing_rate: slice.load_uint(RATE_BITS)?,
        total_raw_available: slice.load_uint(AMOUNT_BITS)?,
        total_raw_debt: slice.load_uint(AMOUNT_BITS)?,
    };
    slice.end_parse()?;
    common.end_parse()?;

    Ok((headers, snapshot))
}

fn load_op(slice: &mut Slice) -> Result<u8, FormatError> {
    Ok(slice.load_u64(EVENT_OP_BITS)? as u8)
}

/// Deposit, withdrawal, borrowing or repayment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonLiquidationEvent {
    pub kind: ActionKind,
    pub headers: EventHeaders,
    pub snapshot: ReserveSnapshot,
    pub message_origin_wallet: Address,
    pub raw_amount: BigUint,
    pub face_amount: BigUint,
}

/// Only needed to build fixtures; the chain is the only real producer.
impl CellPack for NonLiquidationEvent {
    fn pack(&self) -> Result<Cell, CellError> {
        let body = Builder::new()
            .store_address(&self.message_origin_wallet)?
            .store_coins(&self.raw_amount)?
            .store_coins(&self.face_amount)?
            .build()?;

        Builder::new()
            .store_u64(self.kind.op().into(), EVENT_OP_BITS)?
            .store_ref(pack_common(&self.headers, &self.snapshot)?)?
            .store_ref(body)?
            .store_ref(Cell::empty())?
            .build()
    }
}

impl CellUnpack for NonLiquidationEvent {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let kind = ActionKind::try_from(load_op(&mut slice)?)?;
        let (headers, snapshot) = unpack_common(&slice.load_ref()?)?;

        let mut body = slice.load_ref()?.parse();
        let message_origin_wallet = body.load_address()?;
        let raw_amount = body.load_coins()?;
        let face_amount = body.load_coins()?;
        body.end_parse()?;
        slice.end_parse_with_empty_ref()?;

        Ok(NonLiquidationEvent {
            kind,
            headers,
            snapshot,
            message_origin_wallet,
            raw_amount,
            face_amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationEvent {
    pub headers: EventHeaders,
    pub snapshot: ReserveSnapshot,
    pub liquidator_wallet: Address,
    pub liquidated_wallet: Address,
    pub raw_repayment_amount: BigUint,
    pub face_repayment_amount: BigUint,
    pub captured_collateral_reserve_id: u8,
    pub raw_captured_collateral_amount: BigUint,
    pub face_captured_collateral_amount: BigUint,
}

impl LiquidationEvent {
    pub fn debt_reserve_id(&self) -> u8 {
        self.headers.reserve_id
    }
}

impl CellPack for LiquidationEvent {
    fn pack(&self) -> Result<Cell, CellError> {
        let parties = Builder::new()
            .store_address(&self.liquidator_wallet)?
            .store_address(&self.liquidated_wallet)?
            .store_coins(&self.raw_repayment_amount)?
            .store_coins(&self.face_repayment_amount)?
            .build()?;
        let captured = Builder::new()
            .store_u64(self.captured_collateral_reserve_id.into(), RESERVE_ID_BITS)?
            .store_coins(&self.raw_captured_collateral_amount)?
            .store_coins(&self.face_captured_collateral_amount)?
            .build()?;
        let body = Builder::new()
            .store_ref(parties)?
            .store_ref(captured)?
            .store_ref(Cell::empty())?
            .build()?;

        Builder::new()
            .store_u64(EVENT_LIQUIDATION.into(), EVENT_OP_BITS)?
            .store_ref(pack_common(&self.headers, &self.snapshot)?)?
            .store_ref(body)?
            .store_ref(Cell::empty())?
            .build()
    }
}

impl CellUnpack for LiquidationEvent {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let op = load_op(&mut slice)?;
        if op != EVENT_LIQUIDATION {
            return Err(FormatError::UnexpectedOpcode {
                found: op,
                expected: LIQUIDATION_OP,
            });
        }
        let (headers, snapshot) = unpack_common(&slice.load_ref()?)?;

        let mut body = slice.load_ref()?.parse();

        let mut parties = body.load_ref()?.parse();
        let liquidator_wallet = parties.load_address()?;
        let liquidated_wallet = parties.load_address()?;
        let raw_repayment_amount = parties.load_coins()?;
        let face_repayment_amount = parties.load_coins()?;
        parties.end_parse()?;

        let mut captured = body.load_ref()?.parse();
        let captured_collateral_reserve_id = captured.load_u64(RESERVE_ID_BITS)? as u8;
        let raw_captured_collateral_amount = captured.load_coins()?;
        let face_captured_collateral_amount = captured.load_coins()?;
        captured.end_parse()?;

        body.end_parse_with_empty_ref()?;
        slice.end_parse_with_empty_ref()?;

        Ok(LiquidationEvent {
            headers,
            snapshot,
            liquidator_wallet,
            liquidated_wallet,
            raw_repayment_amount,
            face_repayment_amount,
            captured_collateral_reserve_id,
            raw_captured_collateral_amount,
            face_captured_collateral_amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    NonLiquidation(NonLiquidationEvent),
    Liquidation(LiquidationEvent),
}

impl Event {
    /// Picks the layout from the op-code before reading anything else.
    pub fn decode(cell: &Cell) -> Result<Self, FormatError> {
        let op = cell.parse().preload_u64(EVENT_OP_BITS)? as u8;
        if op == EVENT_LIQUIDATION {
            return LiquidationEvent::unpack(cell).map(Event::Liquidation);
        }
        NonLiquidationEvent::unpack(cell).map(Event::NonLiquidation)
    }

    pub fn op(&self) -> u8 {
        match self {
            Event::NonLiquidation(event) => event.kind.op(),
            Event::Liquidation(_) => EVENT_LIQUIDATION,
        }
    }

    pub fn headers(&self) -> &EventHeaders {
        match self {
            Event::NonLiquidation(event) => &event.headers,
            Event::Liquidation(event) => &event.headers,
        }
    }

    pub fn snapshot(&self) -> &ReserveSnapshot {
        match self {
            Event::NonLiquidation(event) => &event.snapshot,
            Event::Liquidation(event) => &event.snapshot,
        }
    }
}

impl CellUnpack for Event {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        Event::decode(cell)
    }
}
