use common_constants::{MAX_CELL_BITS, MAX_CELL_REFS};
use common_errors::CellError;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::{dictionary, Address, Cell, Dictionary, Slice};

/// VarUInteger 16 carries its byte length in 4 bits.
const COINS_LEN_BITS: usize = 4;
const COINS_MAX_BYTES: usize = 15;

/// Appends fields to a cell under construction in call order.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits_used(&self) -> usize {
        self.bit_len
    }

    pub fn refs_used(&self) -> usize {
        self.refs.len()
    }

    pub fn remaining_bits(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    fn ensure_bits(&self, bits: usize) -> Result<(), CellError> {
        if self.bit_len + bits > MAX_CELL_BITS {
            return Err(CellError::BitsOverflow {
                requested: self.bit_len + bits,
            });
        }
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        self.ensure_bits(1)?;
        self.push_bit(bit);
        Ok(self)
    }

    /// Unsigned big-endian integer in exactly `bits` bits.
    pub fn store_uint(&mut self, value: &BigUint, bits: usize) -> Result<&mut Self, CellError> {
        if value.bits() > bits as u64 {
            return Err(CellError::ValueDoesNotFit { bits });
        }
        self.ensure_bits(bits)?;

        let bytes = value.to_bytes_be();
        let available = bytes.len() * 8;
        for i in (0..bits).rev() {
            let bit = i < available && (bytes[bytes.len() - 1 - i / 8] >> (i % 8)) & 1 == 1;
            self.push_bit(bit);
        }
        Ok(self)
    }

    pub fn store_u64(&mut self, value: u64, bits: usize) -> Result<&mut Self, CellError> {
        if bits < 64 && value >> bits != 0 {
            return Err(CellError::ValueDoesNotFit { bits });
        }
        self.ensure_bits(bits)?;

        for i in (0..bits).rev() {
            self.push_bit(i < 64 && (value >> i) & 1 == 1);
        }
        Ok(self)
    }

    /// Two's complement signed integer in exactly `bits` bits.
    pub fn store_int(&mut self, value: &BigInt, bits: usize) -> Result<&mut Self, CellError> {
        if bits == 0 {
            if !value.is_zero() {
                return Err(CellError::ValueDoesNotFit { bits });
            }
            return Ok(self);
        }

        let half = BigInt::one() << (bits - 1);
        if *value >= half || *value < -&half {
            return Err(CellError::ValueDoesNotFit { bits });
        }

        let encoded = match value.sign() {
            Sign::Minus => (BigInt::one() << bits) + value,
            _ => value.clone(),
        };
        let encoded = encoded
            .to_biguint()
            .ok_or(CellError::ValueDoesNotFit { bits })?;
        self.store_uint(&encoded, bits)
    }

    pub fn store_i64(&mut self, value: i64, bits: usize) -> Result<&mut Self, CellError> {
        self.store_int(&BigInt::from(value), bits)
    }

    /// Variable-length token amount: 4-bit byte count, then the bytes.
    pub fn store_coins(&mut self, amount: &BigUint) -> Result<&mut Self, CellError> {
        let len = if amount.is_zero() {
            0
        } else {
            (amount.bits() as usize).div_ceil(8)
        };
        if len > COINS_MAX_BYTES {
            return Err(CellError::ValueDoesNotFit {
                bits: COINS_MAX_BYTES * 8,
            });
        }
        self.ensure_bits(COINS_LEN_BITS + len * 8)?;
        self.store_u64(len as u64, COINS_LEN_BITS)?;
        self.store_uint(amount, len * 8)
    }

    /// `addr_std` without anycast: `10`, `0`, workchain, 256-bit hash.
    pub fn store_address(&mut self, address: &Address) -> Result<&mut Self, CellError> {
        self.ensure_bits(Address::BIT_LEN)?;
        self.push_bit(true);
        self.push_bit(false);
        self.push_bit(false);
        self.store_i64(address.workchain as i64, 8)?;
        self.store_bytes(&address.hash)
    }

    pub fn store_address_none(&mut self) -> Result<&mut Self, CellError> {
        self.store_u64(0, 2)
    }

    pub fn store_maybe_address(&mut self, address: Option<&Address>) -> Result<&mut Self, CellError> {
        match address {
            Some(address) => self.store_address(address),
            None => self.store_address_none(),
        }
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        self.ensure_bits(bytes.len() * 8)?;
        for byte in bytes {
            for i in (0..8).rev() {
                self.push_bit((byte >> i) & 1 == 1);
            }
        }
        Ok(self)
    }

    pub fn store_ref(&mut self, cell: Cell) -> Result<&mut Self, CellError> {
        if self.refs.len() >= MAX_CELL_REFS {
            return Err(CellError::RefsOverflow);
        }
        self.refs.push(cell);
        Ok(self)
    }

    /// Presence bit, then the reference when present.
    pub fn store_maybe_ref(&mut self, cell: Option<Cell>) -> Result<&mut Self, CellError> {
        match cell {
            Some(cell) => {
                if self.refs.len() >= MAX_CELL_REFS {
                    return Err(CellError::RefsOverflow);
                }
                self.store_bit(true)?;
                self.store_ref(cell)
            },
            None => self.store_bit(false),
        }
    }

    /// `HashmapE`: `0` when empty, `1` plus a reference to the root edge.
    pub fn store_dict(&mut self, dict: &Dictionary) -> Result<&mut Self, CellError> {
        let root = dictionary::serialize_root(dict)?;
        self.store_maybe_ref(root)
    }

    /// Copies whatever is left unread in `slice`.
    pub fn store_slice(&mut self, slice: &Slice) -> Result<&mut Self, CellError> {
        let bits = slice.remaining_bits();
        self.ensure_bits(bits)?;
        if self.refs.len() + slice.remaining_refs() > MAX_CELL_REFS {
            return Err(CellError::RefsOverflow);
        }

        let mut reader = slice.clone();
        for _ in 0..bits {
            let bit = reader.load_bit()?;
            self.push_bit(bit);
        }
        while reader.remaining_refs() > 0 {
            let child = reader.load_ref()?;
            self.refs.push(child);
        }
        Ok(self)
    }

    pub fn build(&self) -> Result<Cell, CellError> {
        Cell::new(self.data.clone(), self.bit_len, self.refs.clone())
    }
}
