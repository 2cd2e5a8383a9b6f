use common_errors::AmountParseError;
use num_bigint::BigUint;
use num_traits::Zero;

/// Parses `human` into an integer with `decimals` implied fraction digits.
///
/// `"114.2421"` with 50 decimals is `1142421 * 10^46`.
pub fn from_human(human: &str, decimals: u32) -> Result<BigUint, AmountParseError> {
    let invalid = || AmountParseError {
        input: human.to_owned(),
    };

    let (integer, fraction) = match human.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (human, ""),
    };
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if integer.is_empty() && fraction.is_empty() || !is_digits(integer) || !is_digits(fraction) {
        return Err(invalid());
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(integer.len() + decimals);
    digits.push_str(integer);
    digits.extend(fraction.chars().take(decimals));
    digits.push_str(&"0".repeat(decimals.saturating_sub(fraction.len())));

    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)
}

/// Renders `native` with `decimals` fraction digits, dropping trailing zeros
/// and the dot when nothing is left after it.
pub fn to_human(native: &BigUint, decimals: u32) -> String {
    let digits = native.to_str_radix(10);
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        integer.to_owned()
    } else {
        format!("{integer}.{fraction}")
    }
}
