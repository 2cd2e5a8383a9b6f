use common_cells::{Builder, Cell, CellError, CellPack, CellUnpack, FormatError};
use common_constants::{
    AMOUNT_BITS, DECIMALS_BITS, PERCENT_BITS, RATE_BITS, RESERVE_ACCUMULATOR_BITS, TIMESTAMP_BITS,
};
use common_errors::RangeError;
use common_math::Percentage;
use num_bigint::BigUint;

use crate::TonBool;

/// Static reserve parameters. Percent fields keep the raw stored byte so a
/// decode/encode round trip is exact; use the `*_pct` accessors to compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveConfig {
    pub enabled: bool,
    pub decimals: u8,
    pub borrow_factor: u8,
    pub collateral_factor: u8,
    pub reserve_factor: u8,
    pub liquidation_bonus: u8,
    pub debt_limit: BigUint,
    /// Empty for the native coin reserve.
    pub jetton_wallet_code: Cell,
}

impl ReserveConfig {
    pub fn borrow_factor_pct(&self) -> Result<Percentage, RangeError> {
        Percentage::new(self.borrow_factor)
    }

    pub fn collateral_factor_pct(&self) -> Result<Percentage, RangeError> {
        Percentage::new(self.collateral_factor)
    }

    pub fn reserve_factor_pct(&self) -> Result<Percentage, RangeError> {
        Percentage::new(self.reserve_factor)
    }

    pub fn liquidation_bonus_pct(&self) -> Result<Percentage, RangeError> {
        Percentage::new(self.liquidation_bonus)
    }
}

impl CellPack for ReserveConfig {
    fn pack(&self) -> Result<Cell, CellError> {
        let mut builder = Builder::new();
        TonBool(self.enabled).store(&mut builder)?;
        builder
            .store_u64(self.decimals.into(), DECIMALS_BITS)?
            .store_u64(self.borrow_factor.into(), PERCENT_BITS)?
            .store_u64(self.collateral_factor.into(), PERCENT_BITS)?
            .store_u64(self.reserve_factor.into(), PERCENT_BITS)?
            .store_u64(self.liquidation_bonus.into(), PERCENT_BITS)?
            .store_uint(&self.debt_limit, AMOUNT_BITS)?
            .store_ref(self.jetton_wallet_code.clone())?;
        builder.build()
    }
}

impl CellUnpack for ReserveConfig {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let config = ReserveConfig {
            enabled: TonBool::load(&mut slice)?.into(),
            decimals: slice.load_u64(DECIMALS_BITS)? as u8,
            borrow_factor: slice.load_u64(PERCENT_BITS)? as u8,
            collateral_factor: slice.load_u64(PERCENT_BITS)? as u8,
            reserve_factor: slice.load_u64(PERCENT_BITS)? as u8,
            liquidation_bonus: slice.load_u64(PERCENT_BITS)? as u8,
            debt_limit: slice.load_uint(AMOUNT_BITS)?,
            jetton_wallet_code: slice.load_ref()?,
        };
        slice.end_parse()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveAccumulators {
    pub last_update_timestamp: u64,
    pub lending_accumulator: BigUint,
    pub debt_accumulator: BigUint,
    pub current_lending_rate: BigUint,
    pub current_borrowing_rate: BigUint,
    pub total_raw_amount_to_treasury: BigUint,
}

impl CellPack for ReserveAccumulators {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_u64(self.last_update_timestamp, TIMESTAMP_BITS)?
            .store_uint(&self.lending_accumulator, RESERVE_ACCUMULATOR_BITS)?
            .store_uint(&self.debt_accumulator, RESERVE_ACCUMULATOR_BITS)?
            .store_uint(&self.current_lending_rate, RATE_BITS)?
            .store_uint(&self.current_borrowing_rate, RATE_BITS)?
            .store_uint(&self.total_raw_amount_to_treasury, AMOUNT_BITS)?
            .build()
    }
}

impl CellUnpack for ReserveAccumulators {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let accumulators = ReserveAccumulators {
            last_update_timestamp: slice.load_u64(TIMESTAMP_BITS)?,
            lending_accumulator: slice.load_uint(RESERVE_ACCUMULATOR_BITS)?,
            debt_accumulator: slice.load_uint(RESERVE_ACCUMULATOR_BITS)?,
            current_lending_rate: slice.load_uint(RATE_BITS)?,
            current_borrowing_rate: slice.load_uint(RATE_BITS)?,
            total_raw_amount_to_treasury: slice.load_uint(AMOUNT_BITS)?,
        };
        slice.end_parse()?;
        Ok(accumulators)
    }
}

/// Raw totals, not yet multiplied by an accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveTotals {
    pub total_raw_available: BigUint,
    pub total_raw_debt: BigUint,
}

impl CellPack for ReserveTotals {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_uint(&self.total_raw_available, AMOUNT_BITS)?
            .store_uint(&self.total_raw_debt, AMOUNT_BITS)?
            .build()
    }
}

impl CellUnpack for ReserveTotals {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let totals = ReserveTotals {
            total_raw_available: slice.load_uint(AMOUNT_BITS)?,
            total_raw_debt: slice.load_uint(AMOUNT_BITS)?,
        };
        slice.end_parse()?;
        Ok(totals)
    }
}

/// Kinked rate curve coefficients, one byte each.
///
/// `y_intercept` is not bounded to 100 on chain; it only has to be a legal
/// percentage once it is scaled for a rate computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRateModel {
    pub slope0: u8,
    pub slope1: u8,
    pub y_intercept: u8,
    pub optimal_rate: u8,
}

impl CellPack for InterestRateModel {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_u64(self.slope0.into(), PERCENT_BITS)?
            .store_u64(self.slope1.into(), PERCENT_BITS)?
            .store_u64(self.y_intercept.into(), PERCENT_BITS)?
            .store_u64(self.optimal_rate.into(), PERCENT_BITS)?
            .build()
    }
}

impl CellUnpack for InterestRateModel {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let model = InterestRateModel {
            slope0: slice.load_u64(PERCENT_BITS)? as u8,
            slope1: slice.load_u64(PERCENT_BITS)? as u8,
            y_intercept: slice.load_u64(PERCENT_BITS)? as u8,
            optimal_rate: slice.load_u64(PERCENT_BITS)? as u8,
        };
        slice.end_parse()?;
        Ok(model)
    }
}

/// Point-in-time reserve snapshot. The top cell carries exactly four
/// references (config, accumulators, totals, rate model) and no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveState {
    pub config: ReserveConfig,
    pub accumulators: ReserveAccumulators,
    pub totals: ReserveTotals,
    pub rate_model: InterestRateModel,
}

impl CellPack for ReserveState {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_ref(self.config.pack()?)?
            .store_ref(self.accumulators.pack()?)?
            .store_ref(self.totals.pack()?)?
            .store_ref(self.rate_model.pack()?)?
            .build()
    }
}

impl CellUnpack for ReserveState {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let config = slice.load_ref()?;
        let accumulators = slice.load_ref()?;
        let totals = slice.load_ref()?;
        let rate_model = slice.load_ref()?;
        slice.end_parse()?;

        Ok(ReserveState {
            config: ReserveConfig::unpack(&config)?,
            accumulators: ReserveAccumulators::unpack(&accumulators)?,
            totals: ReserveTotals::unpack(&totals)?,
            rate_model: InterestRateModel::unpack(&rate_model)?,
        })
    }
}
