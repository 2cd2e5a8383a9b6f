use common_errors::RangeError;
use common_math::{Percentage, ScaledValue};
use common_rates::{
    debt_accumulator_at, interest_rates, lending_accumulator_at, pending_treasury_amount,
    raw_to_face, InterestRates,
};
use common_structs::{ReserveState, VariablePerReserve};
use num_bigint::BigUint;

use crate::positions::{BorrowTarget, CollateralInfo, DebtInfo};

/// A fetched reserve snapshot pinned to one timestamp.
///
/// Accumulators are projected once on construction; the snapshot itself is
/// never modified. Refetch the reserve and build a new cache to move forward
/// in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveCache {
    reserve_id: u8,
    reserve: ReserveState,
    timestamp: u64,
    lending_accumulator: ScaledValue,
    debt_accumulator: ScaledValue,
}

impl ReserveCache {
    /// # Arguments
    /// - `reserve_id`: Id the snapshot was fetched for.
    /// - `reserve`: Snapshot as returned by the master contract.
    /// - `timestamp`: Unix time the values are projected to, not older than the snapshot.
    pub fn new(reserve_id: u8, reserve: ReserveState, timestamp: u64) -> Result<Self, RangeError> {
        let lending_accumulator = lending_accumulator_at(&reserve, timestamp)?;
        let debt_accumulator = debt_accumulator_at(&reserve, timestamp)?;

        Ok(ReserveCache {
            reserve_id,
            reserve,
            timestamp,
            lending_accumulator,
            debt_accumulator,
        })
    }

    pub fn reserve_id(&self) -> u8 {
        self.reserve_id
    }

    pub fn reserve(&self) -> &ReserveState {
        &self.reserve
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn decimals(&self) -> u32 {
        self.reserve.config.decimals.into()
    }

    pub fn lending_accumulator(&self) -> &ScaledValue {
        &self.lending_accumulator
    }

    pub fn debt_accumulator(&self) -> &ScaledValue {
        &self.debt_accumulator
    }

    pub fn pending_treasury(&self) -> Result<BigUint, RangeError> {
        pending_treasury_amount(&self.reserve, self.timestamp)
    }

    /// Face value of a raw deposit balance.
    pub fn face_deposit(&self, raw_amount: &BigUint) -> Result<BigUint, RangeError> {
        raw_to_face(raw_amount, &self.lending_accumulator)
    }

    /// Face value of a raw debt balance.
    pub fn face_debt(&self, raw_amount: &BigUint) -> Result<BigUint, RangeError> {
        raw_to_face(raw_amount, &self.debt_accumulator)
    }

    pub fn total_face_available(&self) -> Result<BigUint, RangeError> {
        self.face_deposit(&self.reserve.totals.total_raw_available)
    }

    pub fn total_face_debt(&self) -> Result<BigUint, RangeError> {
        self.face_debt(&self.reserve.totals.total_raw_debt)
    }

    /// Rates the reserve would store if it were updated at this timestamp.
    pub fn projected_rates(&self) -> Result<InterestRates, RangeError> {
        interest_rates(
            &self.reserve.rate_model,
            &self.total_face_available()?,
            &self.total_face_debt()?,
        )
    }

    pub fn collateral_info(
        &self,
        raw_deposit: &BigUint,
        price_8dec: &BigUint,
    ) -> Result<CollateralInfo, RangeError> {
        Ok(CollateralInfo {
            native_amount: self.face_deposit(raw_deposit)?,
            native_decimals: self.decimals(),
            collateral_factor: self.reserve.config.collateral_factor_pct()?,
            price_8dec: price_8dec.clone(),
        })
    }

    /// Debt info weighted by the borrow factor, or unweighted when
    /// `apply_borrow_factor` is false.
    pub fn debt_info(
        &self,
        raw_debt: &BigUint,
        price_8dec: &BigUint,
        apply_borrow_factor: bool,
    ) -> Result<DebtInfo, RangeError> {
        let borrow_factor = if apply_borrow_factor {
            self.reserve.config.borrow_factor_pct()?
        } else {
            Percentage::ZERO
        };

        Ok(DebtInfo {
            native_amount: self.face_debt(raw_debt)?,
            native_decimals: self.decimals(),
            borrow_factor,
            price_8dec: price_8dec.clone(),
        })
    }

    pub fn borrow_target(&self, price_8dec: &BigUint) -> Result<BorrowTarget, RangeError> {
        Ok(BorrowTarget {
            native_decimals: self.decimals(),
            borrow_factor: self.reserve.config.borrow_factor_pct()?,
            price_8dec: price_8dec.clone(),
        })
    }

    /// Entry for the user contract's `fetch_collateral_data` argument.
    pub fn variable_per_reserve(&self, price_8dec: &BigUint) -> VariablePerReserve {
        let config = &self.reserve.config;
        VariablePerReserve {
            decimals: config.decimals,
            borrow_factor: config.borrow_factor,
            collateral_factor: config.collateral_factor,
            lending_accumulator: self.lending_accumulator.raw().clone(),
            debt_accumulator: self.debt_accumulator.raw().clone(),
            price: price_8dec.clone(),
        }
    }
}
