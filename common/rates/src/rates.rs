//! Interest accrual and the default interest rate model (DIRM).
//!
//! Everything here is a pure function of a reserve snapshot. Each step floors
//! in the same order as the contract; reordering the divisions changes the
//! accrued interest over long periods.

use common_constants::{AMOUNT_BITS, RATE_BITS, SECONDS_PER_YEAR};
use common_errors::RangeError;
use common_math::{narrow_to_bits, scale, uint_scale_pct, uint_sub, Percentage, ScaledValue};
use common_structs::{InterestRateModel, ReserveAccumulators, ReserveState};
use log::warn;
use num_bigint::BigUint;
use num_traits::Zero;

/// Seconds between the last on-chain update and `timestamp`.
fn elapsed_since(accumulators: &ReserveAccumulators, timestamp: u64) -> Result<BigUint, RangeError> {
    let last_update = accumulators.last_update_timestamp;
    if timestamp < last_update {
        return Err(RangeError::TimeWentBackwards {
            last_update,
            target: timestamp,
        });
    }
    uint_sub(&BigUint::from(timestamp), &BigUint::from(last_update))
}

/// Returns the lending accumulator (liquidity index) as of `timestamp`.
///
/// The stored accumulator only moves when someone interacts with the reserve,
/// so it is almost always stale.
///
/// **Formula**:
/// - `elapsed = timestamp - last_update_timestamp`.
/// - `growth = lending_rate * elapsed * (SCALE - scale_pct(reserve_factor)) / SECONDS_PER_YEAR / SCALE + SCALE`.
/// - `accumulator = mul(growth, lending_accumulator)`.
///
/// # Arguments
/// - `reserve`: Reserve snapshot as returned by the master contract.
/// - `timestamp`: Target unix time in seconds.
///
/// # Returns
/// - The stored accumulator when `timestamp` equals the last update.
/// - `RangeError::TimeWentBackwards` when `timestamp` is older than the last update.
pub fn lending_accumulator_at(
    reserve: &ReserveState,
    timestamp: u64,
) -> Result<ScaledValue, RangeError> {
    let accumulators = &reserve.accumulators;
    let reserve_factor = uint_scale_pct(reserve.config.reserve_factor_pct()?);
    if accumulators.last_update_timestamp == timestamp {
        return Ok(ScaledValue::from_raw(accumulators.lending_accumulator.clone()));
    }

    let elapsed = elapsed_since(accumulators, timestamp)?;
    let one_minus_reserve_factor = uint_sub(&scale(), &reserve_factor)?;

    let growth = ScaledValue::from_raw(
        &accumulators.current_lending_rate * elapsed * one_minus_reserve_factor
            / SECONDS_PER_YEAR
            / scale()
            + scale(),
    );

    growth.try_mul(&ScaledValue::from_raw(accumulators.lending_accumulator.clone()))
}

/// Returns the debt accumulator as of `timestamp`.
///
/// **Formula**:
/// - `growth = borrowing_rate * elapsed / SECONDS_PER_YEAR + SCALE`.
/// - `accumulator = mul(growth, debt_accumulator)`.
///
/// The reserve factor is not netted out here; the protocol takes its cut on
/// the lending side, see [`pending_treasury_amount`].
pub fn debt_accumulator_at(
    reserve: &ReserveState,
    timestamp: u64,
) -> Result<ScaledValue, RangeError> {
    let accumulators = &reserve.accumulators;
    if accumulators.last_update_timestamp == timestamp {
        return Ok(ScaledValue::from_raw(accumulators.debt_accumulator.clone()));
    }

    let elapsed = elapsed_since(accumulators, timestamp)?;
    let growth = ScaledValue::from_raw(
        &accumulators.current_borrowing_rate * elapsed / SECONDS_PER_YEAR + scale(),
    );

    growth.try_mul(&ScaledValue::from_raw(accumulators.debt_accumulator.clone()))
}

/// Treasury share of the interest accrued since the last update, in raw
/// liquidity units. Zero when no time has passed.
///
/// **Formula**:
/// - `share = lending_rate * elapsed * scale_pct(reserve_factor) / SECONDS_PER_YEAR / SCALE`.
/// - `amount = mul(total_raw_available, mul(share, lending_accumulator))`.
pub fn pending_treasury_amount(reserve: &ReserveState, timestamp: u64) -> Result<BigUint, RangeError> {
    let accumulators = &reserve.accumulators;
    let reserve_factor = uint_scale_pct(reserve.config.reserve_factor_pct()?);
    if accumulators.last_update_timestamp == timestamp {
        return Ok(BigUint::zero());
    }

    let elapsed = elapsed_since(accumulators, timestamp)?;
    let share = ScaledValue::from_raw(
        &accumulators.current_lending_rate * elapsed * reserve_factor / SECONDS_PER_YEAR / scale(),
    );
    let share = share.try_mul(&ScaledValue::from_raw(accumulators.lending_accumulator.clone()))?;

    share.apply_to(&reserve.totals.total_raw_available)
}

/// Rate model coefficients, each one scaled from its stored percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledRateModel {
    pub slope0: ScaledValue,
    pub slope1: ScaledValue,
    pub y_intercept: ScaledValue,
    pub optimal_rate: ScaledValue,
}

impl ScaledRateModel {
    /// Fails when any coefficient is above 100.
    pub fn from_model(model: &InterestRateModel) -> Result<Self, RangeError> {
        Ok(ScaledRateModel {
            slope0: Percentage::new(model.slope0)?.scaled(),
            slope1: Percentage::new(model.slope1)?.scaled(),
            y_intercept: Percentage::new(model.y_intercept)?.scaled(),
            optimal_rate: Percentage::new(model.optimal_rate)?.scaled(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestRates {
    pub lending_rate: ScaledValue,
    pub borrowing_rate: ScaledValue,
}

impl InterestRates {
    pub fn zero() -> Self {
        InterestRates {
            lending_rate: ScaledValue::zero(),
            borrowing_rate: ScaledValue::zero(),
        }
    }
}

/// Wraps `value` into `bits` bits the way the contract's fixed-width fields do,
/// logging when anything was cut off.
fn wrap(value: &BigUint, bits: u64, what: &str) -> BigUint {
    let narrowed = narrow_to_bits(value, bits);
    if narrowed.truncated {
        warn!(
            "{what} {value} does not fit into {bits} bits, wrapped to {}",
            narrowed.value
        );
    }
    narrowed.value
}

fn wrap_rate(rate: &ScaledValue, what: &str) -> ScaledValue {
    ScaledValue::from_raw(wrap(rate.raw(), RATE_BITS as u64, what))
}

/// Share of the reserve's liquidity that is lent out, in units of SCALE.
///
/// Both totals are face values, wrapped to 256 bits like the contract's
/// fields. Returns zero when there is no debt; the check runs on the debt as
/// given, before wrapping.
///
/// ```text
/// utilization = div(debt, add(available, debt))
/// ```
pub fn utilization_rate(
    total_available: &BigUint,
    total_debt: &BigUint,
) -> Result<ScaledValue, RangeError> {
    if total_debt.is_zero() {
        return Ok(ScaledValue::zero());
    }
    let available = wrap(total_available, AMOUNT_BITS as u64, "total available");
    let available = ScaledValue::from_raw(available);
    let debt = ScaledValue::from_raw(wrap(total_debt, AMOUNT_BITS as u64, "total debt"));

    let total_liquidity = available.try_add(&debt)?;
    debt.try_div(&total_liquidity)
}

/// Calculates the borrow rate for a given utilization.
///
/// **Formula**:
/// - If `utilization <= optimal`: `y_intercept + slope0 * (utilization / optimal)`.
/// - Otherwise: `y_intercept + slope0 + slope1 * ((utilization - optimal) / (SCALE - optimal))`.
///
/// The kink itself belongs to the first branch.
pub fn borrow_rate(
    model: &InterestRateModel,
    utilization: &ScaledValue,
) -> Result<ScaledValue, RangeError> {
    let scaled = ScaledRateModel::from_model(model)?;

    if *utilization <= scaled.optimal_rate {
        let utilization_ratio = utilization.try_div(&scaled.optimal_rate)?;
        let slope_contribution = scaled.slope0.try_mul(&utilization_ratio)?;
        scaled.y_intercept.try_add(&slope_contribution)
    } else {
        let excess_utilization = utilization.try_sub(&scaled.optimal_rate)?;
        let optimal_to_one = ScaledValue::one().try_sub(&scaled.optimal_rate)?;
        let excess_ratio = excess_utilization.try_div(&optimal_to_one)?;
        let slope_contribution = scaled.slope1.try_mul(&excess_ratio)?;
        let base_rate = scaled.y_intercept.try_add(&scaled.slope0)?;
        slope_contribution.try_add(&base_rate)
    }
}

/// Lending and borrowing rates for the given face totals.
///
/// **Formula**:
/// - `borrowing_rate = borrow_rate(model, utilization)`.
/// - `lending_rate = mul(borrowing_rate, utilization)`.
/// - Both are wrapped to 128 bits, as stored on chain.
///
/// # Returns
/// - Zero rates when utilization is zero.
pub fn interest_rates(
    model: &InterestRateModel,
    total_available: &BigUint,
    total_debt: &BigUint,
) -> Result<InterestRates, RangeError> {
    let utilization = utilization_rate(total_available, total_debt)?;
    if utilization.is_zero() {
        return Ok(InterestRates::zero());
    }

    let borrowing_rate = borrow_rate(model, &utilization)?;
    let lending_rate = borrowing_rate.try_mul(&utilization)?;

    Ok(InterestRates {
        lending_rate: wrap_rate(&lending_rate, "lending rate"),
        borrowing_rate: wrap_rate(&borrowing_rate, "borrowing rate"),
    })
}

/// Face value of a raw balance: `mul(raw, accumulator)`.
pub fn raw_to_face(
    raw_amount: &BigUint,
    accumulator: &ScaledValue,
) -> Result<BigUint, RangeError> {
    accumulator.apply_to(raw_amount)
}
