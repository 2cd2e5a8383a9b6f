use common_errors::CellError;
use num_bigint::{BigInt, BigUint};
use num_traits::One;

use crate::{dictionary, Address, Cell, Dictionary};

/// Read cursor over a cell. Fields come back in the order they were stored.
#[derive(Debug, Clone)]
pub struct Slice {
    cell: Cell,
    bit_pos: usize,
    ref_pos: usize,
}

impl Slice {
    pub fn new(cell: Cell) -> Self {
        Slice {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    pub fn remaining_refs(&self) -> usize {
        self.cell.refs().len() - self.ref_pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    fn bit_at(&self, pos: usize) -> bool {
        (self.cell.data()[pos / 8] >> (7 - pos % 8)) & 1 == 1
    }

    fn ensure_bits(&self, bits: usize) -> Result<(), CellError> {
        let remaining = self.remaining_bits();
        if bits > remaining {
            return Err(CellError::ReadPastEnd {
                requested: bits,
                remaining,
            });
        }
        Ok(())
    }

    pub fn skip_bits(&mut self, bits: usize) -> Result<&mut Self, CellError> {
        self.ensure_bits(bits)?;
        self.bit_pos += bits;
        Ok(self)
    }

    pub fn load_bit(&mut self) -> Result<bool, CellError> {
        self.ensure_bits(1)?;
        let bit = self.bit_at(self.bit_pos);
        self.bit_pos += 1;
        Ok(bit)
    }

    pub fn load_uint(&mut self, bits: usize) -> Result<BigUint, CellError> {
        self.ensure_bits(bits)?;

        let len = bits.div_ceil(8);
        let shift = len * 8 - bits;
        let mut bytes = vec![0u8; len];
        for i in 0..bits {
            if self.bit_at(self.bit_pos + i) {
                let target = shift + i;
                bytes[target / 8] |= 0x80 >> (target % 8);
            }
        }
        self.bit_pos += bits;

        Ok(BigUint::from_bytes_be(&bytes))
    }

    pub fn preload_uint(&self, bits: usize) -> Result<BigUint, CellError> {
        self.clone().load_uint(bits)
    }

    pub fn preload_u64(&self, bits: usize) -> Result<u64, CellError> {
        if bits > 64 {
            return Err(CellError::ValueDoesNotFit { bits });
        }
        self.ensure_bits(bits)?;

        let mut value = 0u64;
        for i in 0..bits {
            value = (value << 1) | self.bit_at(self.bit_pos + i) as u64;
        }
        Ok(value)
    }

    pub fn load_u64(&mut self, bits: usize) -> Result<u64, CellError> {
        let value = self.preload_u64(bits)?;
        self.bit_pos += bits;
        Ok(value)
    }

    pub fn load_int(&mut self, bits: usize) -> Result<BigInt, CellError> {
        if bits == 0 {
            return Ok(BigInt::default());
        }
        let raw = BigInt::from(self.load_uint(bits)?);
        let half = BigInt::one() << (bits - 1);
        if raw >= half {
            return Ok(raw - (BigInt::one() << bits));
        }
        Ok(raw)
    }

    pub fn load_i64(&mut self, bits: usize) -> Result<i64, CellError> {
        if bits == 0 || bits > 64 {
            return Err(CellError::ValueDoesNotFit { bits });
        }
        let raw = self.load_u64(bits)?;
        if bits == 64 {
            return Ok(raw as i64);
        }
        if raw >> (bits - 1) & 1 == 1 {
            return Ok((raw as i128 - (1i128 << bits)) as i64);
        }
        Ok(raw as i64)
    }

    pub fn load_coins(&mut self) -> Result<BigUint, CellError> {
        let len = self.load_u64(4)? as usize;
        self.load_uint(len * 8)
    }

    pub fn load_bytes(&mut self, len: usize) -> Result<Vec<u8>, CellError> {
        self.ensure_bits(len * 8)?;
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(self.load_u64(8)? as u8);
        }
        Ok(bytes)
    }

    /// Only `addr_std` without anycast is accepted.
    pub fn load_address(&mut self) -> Result<Address, CellError> {
        match self.load_maybe_address()? {
            Some(address) => Ok(address),
            None => Err(CellError::InvalidAddress("addr_none".into())),
        }
    }

    /// `addr_none` reads as `None`.
    pub fn load_maybe_address(&mut self) -> Result<Option<Address>, CellError> {
        match self.load_u64(2)? {
            0b00 => Ok(None),
            0b10 => {
                if self.load_bit()? {
                    return Err(CellError::InvalidAddress("anycast is not supported".into()));
                }
                let workchain = self.load_i64(8)? as i8;
                let hash: [u8; 32] = self
                    .load_bytes(32)?
                    .try_into()
                    .map_err(|_| CellError::InvalidAddress("short hash".into()))?;
                Ok(Some(Address::new(workchain, hash)))
            },
            0b01 => Err(CellError::InvalidAddress("external addresses are not supported".into())),
            _ => Err(CellError::InvalidAddress("var addresses are not supported".into())),
        }
    }

    pub fn load_ref(&mut self) -> Result<Cell, CellError> {
        let cell = self
            .cell
            .reference(self.ref_pos)
            .cloned()
            .ok_or(CellError::NoMoreRefs)?;
        self.ref_pos += 1;
        Ok(cell)
    }

    pub fn load_maybe_ref(&mut self) -> Result<Option<Cell>, CellError> {
        if self.load_bit()? {
            return self.load_ref().map(Some);
        }
        Ok(None)
    }

    /// `HashmapE` with `key_bits`-bit keys and cell references as values.
    pub fn load_dict(&mut self, key_bits: usize) -> Result<Dictionary, CellError> {
        match self.load_maybe_ref()? {
            Some(root) => dictionary::parse_root(&root, key_bits),
            None => Ok(Dictionary::new(key_bits)),
        }
    }

    /// Fails unless every bit and reference has been consumed.
    pub fn end_parse(&self) -> Result<(), CellError> {
        if !self.is_empty() {
            return Err(CellError::UnreadData {
                bits: self.remaining_bits(),
                refs: self.remaining_refs(),
            });
        }
        Ok(())
    }

    /// Reads the final `^empty` reference, then fails unless nothing is left.
    pub fn end_parse_with_empty_ref(&mut self) -> Result<(), CellError> {
        if self.remaining_bits() != 0 {
            return Err(CellError::UnreadData {
                bits: self.remaining_bits(),
                refs: self.remaining_refs(),
            });
        }
        let trailer = self.load_ref()?;
        if !trailer.is_empty() {
            return Err(CellError::UnreadData {
                bits: trailer.bit_len(),
                refs: trailer.refs().len(),
            });
        }
        self.end_parse()
    }
}
