use common_errors::RangeError;
use common_math::{scale, ten_pow, uint_add, uint_mul_decimals, Percentage};
use common_structs::CollateralData;
use log::warn;
use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, ToPrimitive, Zero};

/// A deposit to value as collateral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateralInfo {
    /// Amount in the asset's smallest unit, e.g. `1.23` of a 9-decimal asset is `1230000000`.
    pub native_amount: BigUint,
    pub native_decimals: u32,
    pub collateral_factor: Percentage,
    /// USD price with 8 decimals, e.g. `1.23` is `123000000`.
    pub price_8dec: BigUint,
}

/// A debt to value against collateral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtInfo {
    pub native_amount: BigUint,
    pub native_decimals: u32,
    /// Zero leaves the USD value as is.
    pub borrow_factor: Percentage,
    pub price_8dec: BigUint,
}

/// The asset a borrow capacity is computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowTarget {
    pub native_decimals: u32,
    pub borrow_factor: Percentage,
    pub price_8dec: BigUint,
}

/// Running USD totals of a position: discounted collateral on one side,
/// borrow-factor-weighted debt on the other.
///
/// Caller-owned and not meant to be shared between threads without external
/// synchronisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collateralization {
    discounted_collateral_usd: BigUint,
    debt_usd: BigUint,
}

impl Collateralization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discounted_collateral_usd(&self) -> &BigUint {
        &self.discounted_collateral_usd
    }

    pub fn debt_usd(&self) -> &BigUint {
        &self.debt_usd
    }

    /// USD value of `info`, discounted by its collateral factor.
    ///
    /// **Formula**:
    /// - `usd = native_amount * price_8dec / 10^native_decimals`.
    /// - `discounted = usd * scale_pct(collateral_factor) / SCALE`.
    pub fn value_collateral(info: &CollateralInfo) -> Result<BigUint, RangeError> {
        let usd = uint_mul_decimals(&info.native_amount, &info.price_8dec, info.native_decimals)?;
        info.collateral_factor.scaled().apply_to(&usd)
    }

    /// USD value of `info`, inflated by the inverse of its borrow factor.
    ///
    /// **Formula**:
    /// - `usd = native_amount * price_8dec / 10^native_decimals`.
    /// - `exaggerated = usd * SCALE / scale_pct(borrow_factor)`, or `usd` when the factor is zero.
    pub fn value_debt(info: &DebtInfo) -> Result<BigUint, RangeError> {
        let usd = uint_mul_decimals(&info.native_amount, &info.price_8dec, info.native_decimals)?;
        if info.borrow_factor.is_zero() {
            return Ok(usd);
        }
        info.borrow_factor.scaled().apply_inverse_to(&usd)
    }

    /// Adds `info` to the collateral total and returns its discounted value.
    pub fn add_collateral(&mut self, info: &CollateralInfo) -> Result<BigUint, RangeError> {
        let value = Self::value_collateral(info)?;
        self.discounted_collateral_usd = uint_add(&self.discounted_collateral_usd, &value)?;
        Ok(value)
    }

    /// Adds `info` to the debt total and returns its weighted value.
    pub fn add_debt(&mut self, info: &DebtInfo) -> Result<BigUint, RangeError> {
        let value = Self::value_debt(info)?;
        self.debt_usd = uint_add(&self.debt_usd, &value)?;
        Ok(value)
    }

    /// Largest native amount of `target` that can still be borrowed while the
    /// position stays at a ratio of exactly one.
    ///
    /// **Formula**:
    /// - `room = sum(value_collateral) - sum(value_debt)`.
    /// - `capacity = room * scale_pct(borrow_factor) / SCALE * 10^native_decimals / price_8dec`.
    ///
    /// # Returns
    /// - A negative amount when the debts already exceed the collateral. It is
    ///   not clamped; treat anything below zero as no capacity.
    pub fn max_borrow_capacity(
        collaterals: &[CollateralInfo],
        other_debts: &[DebtInfo],
        target: &BorrowTarget,
    ) -> Result<BigInt, RangeError> {
        if target.price_8dec.is_zero() {
            return Err(RangeError::DivisionByZero);
        }

        let totals = Self::requirement(collaterals, other_debts)?;
        let room = BigInt::from(totals.total_discounted_face_deposit)
            - BigInt::from(totals.total_collateral_required);

        let capacity = room * BigInt::from(target.borrow_factor.scaled().into_raw())
            / BigInt::from(scale())
            * BigInt::from(ten_pow(target.native_decimals))
            / BigInt::from(target.price_8dec.clone());

        if capacity.is_negative() {
            warn!("borrow capacity is negative ({capacity}), position is undercollateralized");
        }
        Ok(capacity)
    }

    /// Totals for `collaterals` and `debts` without touching any running
    /// state, in the same shape the user contract's getter reports them.
    pub fn requirement(
        collaterals: &[CollateralInfo],
        debts: &[DebtInfo],
    ) -> Result<CollateralData, RangeError> {
        let mut totals = Collateralization::new();
        for collateral in collaterals {
            totals.add_collateral(collateral)?;
        }
        for debt in debts {
            totals.add_debt(debt)?;
        }

        Ok(CollateralData {
            total_discounted_face_deposit: totals.discounted_collateral_usd,
            total_collateral_required: totals.debt_usd,
        })
    }

    /// Collateral over debt, for display. `None` without debt.
    pub fn ratio(&self) -> Option<f64> {
        if self.debt_usd.is_zero() {
            return None;
        }
        let collateral = self.discounted_collateral_usd.to_f64()?;
        let debt = self.debt_usd.to_f64()?;
        Some(collateral / debt)
    }

    pub fn is_solvent(&self) -> bool {
        self.discounted_collateral_usd >= self.debt_usd
    }
}
