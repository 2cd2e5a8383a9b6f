//! Seams to the network. Implementations live with the caller; this crate
//! only builds the arguments and reads the answers.

use std::collections::VecDeque;

use common_cells::{Address, Builder, Cell};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

use crate::{
    errors::{ChainError, Error},
    messages::OutboundMessage,
};

/// One entry of a get-method argument list or result stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackValue {
    Null,
    Int(BigInt),
    Cell(Cell),
    Slice(Cell),
}

impl StackValue {
    pub fn int(value: impl Into<BigInt>) -> Self {
        StackValue::Int(value.into())
    }

    /// An address passed as a slice argument.
    pub fn address(address: &Address) -> Result<Self, Error> {
        let cell = Builder::new().store_address(address)?.build()?;
        Ok(StackValue::Slice(cell))
    }
}

/// Runs get-methods against deployed contracts.
pub trait ChainReader {
    fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        args: &[StackValue],
    ) -> Result<Vec<StackValue>, ChainError>;
}

/// Signs and sends messages on behalf of the user.
pub trait ChainWriter {
    fn send(&self, message: OutboundMessage) -> Result<(), ChainError>;
}

/// Pops typed values off a get-method result, top of stack first.
#[derive(Debug)]
pub struct StackReader {
    method: String,
    entries: VecDeque<StackValue>,
}

impl StackReader {
    pub fn new(method: &str, entries: Vec<StackValue>) -> Self {
        StackReader {
            method: method.to_owned(),
            entries: entries.into(),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ChainError {
        ChainError::UnexpectedStackEntry {
            method: self.method.clone(),
            expected,
        }
    }

    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    pub fn read_int(&mut self) -> Result<BigInt, ChainError> {
        match self.entries.pop_front() {
            Some(StackValue::Int(value)) => Ok(value),
            _ => Err(self.unexpected("int")),
        }
    }

    pub fn read_uint(&mut self) -> Result<BigUint, ChainError> {
        let value = self.read_int()?;
        value
            .to_biguint()
            .ok_or_else(|| self.unexpected("non-negative int"))
    }

    pub fn read_u64(&mut self) -> Result<u64, ChainError> {
        let value = self.read_int()?;
        value.to_u64().ok_or_else(|| self.unexpected("u64"))
    }

    pub fn read_i64(&mut self) -> Result<i64, ChainError> {
        let value = self.read_int()?;
        value.to_i64().ok_or_else(|| self.unexpected("i64"))
    }

    /// Cells and slices both carry a cell.
    pub fn read_cell(&mut self) -> Result<Cell, ChainError> {
        match self.entries.pop_front() {
            Some(StackValue::Cell(cell)) | Some(StackValue::Slice(cell)) => Ok(cell),
            _ => Err(self.unexpected("cell")),
        }
    }

    pub fn read_address(&mut self) -> Result<Address, Error> {
        let cell = self.read_cell()?;
        let mut slice = cell.parse();
        let address = slice.load_address()?;
        slice.end_parse()?;
        Ok(address)
    }
}
