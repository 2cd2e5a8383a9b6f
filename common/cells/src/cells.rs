//! Bit-level cell tree used for every on-chain record.
//!
//! A [`Cell`] holds up to 1023 bits and up to 4 ordered child references and
//! never changes once built. [`Builder`] appends fields in call order,
//! [`Slice`] reads them back and must be fully consumed.

mod address;
mod boc;
mod builder;
mod cell;
mod dictionary;
mod slice;

pub use address::Address;
pub use boc::{crc32c, deserialize_boc, serialize_boc};
pub use builder::Builder;
pub use cell::Cell;
pub use common_errors::{CellError, FormatError};
pub use dictionary::Dictionary;
pub use slice::Slice;

/// Serializes a typed record into its cell layout.
pub trait CellPack {
    fn pack(&self) -> Result<Cell, CellError>;

    fn to_boc(&self) -> Result<Vec<u8>, CellError> {
        Ok(self.pack()?.to_boc())
    }
}

/// Reads a typed record back from its cell layout.
pub trait CellUnpack: Sized {
    fn unpack(cell: &Cell) -> Result<Self, FormatError>;

    fn from_boc(bytes: &[u8]) -> Result<Self, FormatError> {
        Self::unpack(&Cell::from_boc(bytes)?)
    }
}
