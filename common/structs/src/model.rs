//! Typed views over the protocol's on-chain records.

use common_cells::{Builder, CellError, FormatError, Slice};
use common_constants::ENABLED_FLAG_BITS;

mod collateral;
mod locks;
mod reserve;
mod state_init;
mod user;

pub use collateral::*;
pub use locks::*;
pub use reserve::*;
pub use state_init::*;
pub use user::*;

/// Contract boolean: `-1` is true, `0` is false, nothing else is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonBool(pub bool);

impl TonBool {
    pub const TRUE: TonBool = TonBool(true);
    pub const FALSE: TonBool = TonBool(false);

    pub fn from_int(value: i64) -> Result<Self, FormatError> {
        match value {
            -1 => Ok(TonBool::TRUE),
            0 => Ok(TonBool::FALSE),
            other => Err(FormatError::InvalidBoolean(other)),
        }
    }

    pub fn as_int(self) -> i64 {
        if self.0 {
            -1
        } else {
            0
        }
    }

    /// Two-bit signed field.
    pub fn store(self, builder: &mut Builder) -> Result<(), CellError> {
        builder.store_i64(self.as_int(), ENABLED_FLAG_BITS)?;
        Ok(())
    }

    pub fn load(slice: &mut Slice) -> Result<Self, FormatError> {
        Self::from_int(slice.load_i64(ENABLED_FLAG_BITS)?)
    }
}

impl From<bool> for TonBool {
    fn from(value: bool) -> Self {
        TonBool(value)
    }
}

impl From<TonBool> for bool {
    fn from(value: TonBool) -> Self {
        value.0
    }
}
