//! Conversions between on-chain integers and what a user reads or types.
//!
//! Amount strings are plain decimals: digits with at most one `.`. Digits
//! past the target precision are dropped, so converting a string with more
//! fraction digits than `decimals` loses them without failing.

pub mod bool_humanizer;
pub mod generic_number;
pub mod scaled_number;

pub use common_errors::AmountParseError;
