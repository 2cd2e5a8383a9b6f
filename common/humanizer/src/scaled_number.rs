use common_constants::SCALE_PRECISION;
use common_errors::AmountParseError;
use num_bigint::BigUint;

use crate::generic_number;

/// Amount in units of SCALE, e.g. `"1.142421"` to `1142421 * 10^21`.
pub fn from_human(human: &str) -> Result<BigUint, AmountParseError> {
    generic_number::from_human(human, SCALE_PRECISION)
}

pub fn to_human(native: &BigUint) -> String {
    generic_number::to_human(native, SCALE_PRECISION)
}
