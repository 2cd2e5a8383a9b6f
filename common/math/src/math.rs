//! Scaled fixed-point arithmetic mirroring the contract's `math` helpers.
//!
//! Every operation works on non-negative integers bounded by `2^257 - 1` and
//! truncates (floors) exactly where the contract does. Negative operands are
//! unrepresentable here: amounts are `BigUint`, so the only way to go below
//! zero is a subtraction, which fails with [`RangeError::NegativeResult`].

use core::fmt;

use common_constants::{MAX_UINT_257_BITS, PERCENT_100, SCALE};
use common_errors::RangeError;
use num_bigint::BigUint;
use num_traits::{One, Zero};

pub fn scale() -> BigUint {
    BigUint::from(SCALE)
}

pub fn ten_pow(decimals: u32) -> BigUint {
    BigUint::from(10u32).pow(decimals)
}

/// Rejects anything above the 257-bit ceiling.
pub fn ensure_in_domain(value: BigUint) -> Result<BigUint, RangeError> {
    if value.bits() > MAX_UINT_257_BITS {
        return Err(RangeError::Overflow);
    }
    Ok(value)
}

pub fn uint_add(a: &BigUint, b: &BigUint) -> Result<BigUint, RangeError> {
    ensure_in_domain(a + b)
}

pub fn uint_sub(a: &BigUint, b: &BigUint) -> Result<BigUint, RangeError> {
    if b > a {
        return Err(RangeError::NegativeResult);
    }
    ensure_in_domain(a - b)
}

/// `a * b / SCALE`, where `b` is already scaled by `SCALE`.
///
/// `uint_mul(1000000320586022935070387176, 1000000000564234572341374307)` is
/// `1000000321150257688297479032`, the plain product truncated back to SCALE.
pub fn uint_mul(a: &BigUint, b: &BigUint) -> Result<BigUint, RangeError> {
    ensure_in_domain((a * b) / scale())
}

/// `a * SCALE / b`, where `b` is already scaled by `SCALE`.
pub fn uint_div(a: &BigUint, b: &BigUint) -> Result<BigUint, RangeError> {
    if b.is_zero() {
        return Err(RangeError::DivisionByZero);
    }
    ensure_in_domain((a * scale()) / b)
}

pub fn uint_scale_pct(pct: Percentage) -> BigUint {
    (BigUint::from(pct.value()) * scale()) / BigUint::from(PERCENT_100)
}

/// `a * b / 10^b_decimals`, for when `b` carries its own decimal scale.
pub fn uint_mul_decimals(a: &BigUint, b: &BigUint, b_decimals: u32) -> Result<BigUint, RangeError> {
    ensure_in_domain((a * b) / ten_pow(b_decimals))
}

/// `a * 10^b_decimals / b`, for when `b` carries its own decimal scale.
pub fn uint_div_decimals(a: &BigUint, b: &BigUint, b_decimals: u32) -> Result<BigUint, RangeError> {
    if b.is_zero() {
        return Err(RangeError::DivisionByZero);
    }
    ensure_in_domain((a * ten_pow(b_decimals)) / b)
}

/// Result of a fixed-width narrowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowedValue {
    pub value: BigUint,
    /// Set when bits above the target width were dropped.
    pub truncated: bool,
}

/// Keeps the low `bits` bits of `value`, i.e. `value mod 2^bits`, the way the
/// contract stores a wider intermediate into a fixed-width field.
pub fn narrow_to_bits(value: &BigUint, bits: u64) -> NarrowedValue {
    if value.bits() <= bits {
        return NarrowedValue {
            value: value.clone(),
            truncated: false,
        };
    }
    let modulus = BigUint::one() << bits;
    NarrowedValue {
        value: value % &modulus,
        truncated: true,
    }
}

/// A whole percent in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(PERCENT_100);

    pub fn new(pct: u8) -> Result<Self, RangeError> {
        if pct > PERCENT_100 {
            return Err(RangeError::PercentageOutOfRange(pct));
        }
        Ok(Percentage(pct))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `pct * SCALE / 100`
    pub fn scaled(self) -> ScaledValue {
        ScaledValue(uint_scale_pct(self))
    }
}

impl TryFrom<u8> for Percentage {
    type Error = RangeError;

    fn try_from(pct: u8) -> Result<Self, Self::Error> {
        Percentage::new(pct)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A value carried as `actual * 10^27`: accumulators, rates, utilization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ScaledValue(BigUint);

impl ScaledValue {
    pub fn from_raw(raw: BigUint) -> Self {
        ScaledValue(raw)
    }

    pub fn zero() -> Self {
        ScaledValue(BigUint::zero())
    }

    /// 1.0, i.e. `SCALE`.
    pub fn one() -> Self {
        ScaledValue(scale())
    }

    pub fn raw(&self) -> &BigUint {
        &self.0
    }

    pub fn into_raw(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn try_add(&self, other: &ScaledValue) -> Result<ScaledValue, RangeError> {
        uint_add(&self.0, &other.0).map(ScaledValue)
    }

    pub fn try_sub(&self, other: &ScaledValue) -> Result<ScaledValue, RangeError> {
        uint_sub(&self.0, &other.0).map(ScaledValue)
    }

    pub fn try_mul(&self, other: &ScaledValue) -> Result<ScaledValue, RangeError> {
        uint_mul(&self.0, &other.0).map(ScaledValue)
    }

    pub fn try_div(&self, other: &ScaledValue) -> Result<ScaledValue, RangeError> {
        uint_div(&self.0, &other.0).map(ScaledValue)
    }

    /// Applies this factor to a plain amount: `amount * self / SCALE`.
    /// Turns a raw balance into a face amount when `self` is an accumulator.
    pub fn apply_to(&self, amount: &BigUint) -> Result<BigUint, RangeError> {
        uint_mul(amount, &self.0)
    }

    /// `amount * SCALE / self`, e.g. weighting a debt by a borrow factor.
    pub fn apply_inverse_to(&self, amount: &BigUint) -> Result<BigUint, RangeError> {
        uint_div(amount, &self.0)
    }
}

impl From<BigUint> for ScaledValue {
    fn from(raw: BigUint) -> Self {
        ScaledValue(raw)
    }
}

impl From<u128> for ScaledValue {
    fn from(raw: u128) -> Self {
        ScaledValue(BigUint::from(raw))
    }
}

impl fmt::Display for ScaledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
