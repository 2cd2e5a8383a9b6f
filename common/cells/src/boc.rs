//! Bag-of-cells byte format.
//!
//! ```text
//! b5ee9c72 | flags:size_bytes | off_bytes | cells | roots | absent
//!          | tot_cells_size | root indices | [index] | cell data | [crc32c]
//! ```
//!
//! Cells are written parents first and deduplicated by representation hash.

use std::collections::{HashMap, HashSet};

use common_errors::CellError;

use crate::Cell;

const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

const FLAG_HAS_INDEX: u8 = 0x80;
const FLAG_HAS_CRC32C: u8 = 0x40;
const FLAG_HAS_CACHE_BITS: u8 = 0x20;
const SIZE_BYTES_MASK: u8 = 0x07;

const CRC32C_POLY: u32 = 0x82f6_3b78;

const CRC32C_TABLE: [u32; 256] = crc32c_table();

const fn crc32c_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = index as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ CRC32C_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

/// CRC-32C (Castagnoli), as used by the bag-of-cells trailer.
pub fn crc32c(bytes: &[u8]) -> u32 {
    let crc = bytes.iter().fold(!0u32, |crc, byte| {
        CRC32C_TABLE[((crc ^ u32::from(*byte)) & 0xff) as usize] ^ (crc >> 8)
    });
    !crc
}

fn bytes_needed(value: usize) -> usize {
    let bits = (usize::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

fn write_be(out: &mut Vec<u8>, value: usize, width: usize) {
    for i in (0..width).rev() {
        out.push((value >> (8 * i)) as u8);
    }
}

fn collect_postorder(cell: &Cell, seen: &mut HashSet<[u8; 32]>, order: &mut Vec<Cell>) {
    if !seen.insert(cell.hash()) {
        return;
    }
    for child in cell.refs() {
        collect_postorder(child, seen, order);
    }
    order.push(cell.clone());
}

/// Single-root bag with a CRC32C trailer and no index.
pub fn serialize_boc(root: &Cell) -> Vec<u8> {
    let mut order = Vec::new();
    collect_postorder(root, &mut HashSet::new(), &mut order);
    order.reverse();

    let index: HashMap<[u8; 32], usize> = order
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell.hash(), i))
        .collect();

    let size_bytes = bytes_needed(order.len());

    let mut cells_data = Vec::new();
    for cell in &order {
        cells_data.extend_from_slice(&cell.descriptors());
        cells_data.extend_from_slice(&cell.augmented_data());
        for child in cell.refs() {
            write_be(&mut cells_data, index[&child.hash()], size_bytes);
        }
    }
    let off_bytes = bytes_needed(cells_data.len());

    let mut out = Vec::with_capacity(cells_data.len() + 32);
    out.extend_from_slice(&BOC_MAGIC);
    out.push(FLAG_HAS_CRC32C | size_bytes as u8);
    out.push(off_bytes as u8);
    write_be(&mut out, order.len(), size_bytes);
    write_be(&mut out, 1, size_bytes);
    write_be(&mut out, 0, size_bytes);
    write_be(&mut out, cells_data.len(), off_bytes);
    write_be(&mut out, 0, size_bytes);
    out.extend_from_slice(&cells_data);

    let checksum = crc32c(&out);
    out.extend_from_slice(&checksum.to_le_bytes());
    out
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], CellError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(CellError::InvalidBoc("truncated"))?;
        let chunk = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(chunk)
    }

    fn u8(&mut self) -> Result<u8, CellError> {
        Ok(self.take(1)?[0])
    }

    fn be(&mut self, width: usize) -> Result<usize, CellError> {
        Ok(self
            .take(width)?
            .iter()
            .fold(0usize, |acc, byte| (acc << 8) | *byte as usize))
    }
}

struct RawCell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<usize>,
}

/// Parses every root of a bag of cells. Exotic cells are rejected.
pub fn deserialize_boc(bytes: &[u8]) -> Result<Vec<Cell>, CellError> {
    let mut reader = Reader { bytes, pos: 0 };

    if reader.take(4)? != BOC_MAGIC.as_slice() {
        return Err(CellError::InvalidBoc("unknown magic"));
    }

    let flags = reader.u8()?;
    let has_index = flags & FLAG_HAS_INDEX != 0;
    let has_crc = flags & FLAG_HAS_CRC32C != 0;
    let has_cache_bits = flags & FLAG_HAS_CACHE_BITS != 0;
    let size_bytes = (flags & SIZE_BYTES_MASK) as usize;
    if !(1..=4).contains(&size_bytes) {
        return Err(CellError::InvalidBoc("bad size_bytes"));
    }
    if has_cache_bits && !has_index {
        return Err(CellError::InvalidBoc("cache bits without index"));
    }

    let off_bytes = reader.u8()? as usize;
    if !(1..=8).contains(&off_bytes) {
        return Err(CellError::InvalidBoc("bad off_bytes"));
    }

    let cell_count = reader.be(size_bytes)?;
    let root_count = reader.be(size_bytes)?;
    let _absent = reader.be(size_bytes)?;
    let total_size = reader.be(off_bytes)?;

    if root_count == 0 || root_count > cell_count {
        return Err(CellError::InvalidBoc("bad root count"));
    }

    let mut roots = Vec::with_capacity(root_count);
    for _ in 0..root_count {
        let root = reader.be(size_bytes)?;
        if root >= cell_count {
            return Err(CellError::InvalidBoc("root index out of range"));
        }
        roots.push(root);
    }

    if has_index {
        reader.take(cell_count * off_bytes)?;
    }

    let data_start = reader.pos;
    let mut raw_cells = Vec::with_capacity(cell_count);
    for i in 0..cell_count {
        let [d1, d2] = [reader.u8()?, reader.u8()?];
        if d1 & 0x08 != 0 {
            return Err(CellError::ExoticCell);
        }
        if d1 & 0xf0 != 0 {
            return Err(CellError::InvalidBoc("stored hashes or levels are not supported"));
        }

        let ref_count = (d1 & 0x07) as usize;
        if ref_count > 4 {
            return Err(CellError::InvalidBoc("too many references"));
        }

        let data_len = (d2 as usize).div_ceil(2);
        let mut data = reader.take(data_len)?.to_vec();
        let bit_len = if d2 % 2 == 0 {
            data_len * 8
        } else {
            let last = data.last_mut().ok_or(CellError::InvalidBoc("missing data"))?;
            if *last == 0 {
                return Err(CellError::InvalidBoc("missing completion tag"));
            }
            let tag = last.trailing_zeros() as usize;
            *last &= !(1u8 << tag);
            data_len * 8 - tag - 1
        };

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let child = reader.be(size_bytes)?;
            if child <= i || child >= cell_count {
                return Err(CellError::InvalidBoc("reference order"));
            }
            refs.push(child);
        }

        raw_cells.push(RawCell {
            data,
            bit_len,
            refs,
        });
    }

    if reader.pos - data_start != total_size {
        return Err(CellError::InvalidBoc("cell data size mismatch"));
    }

    if has_crc {
        let expected = u32::from_le_bytes(
            reader
                .take(4)?
                .try_into()
                .map_err(|_| CellError::InvalidBoc("truncated"))?,
        );
        if crc32c(&bytes[..reader.pos - 4]) != expected {
            return Err(CellError::BocCrcMismatch);
        }
    }

    // Children always follow their parents, so build back to front.
    let mut built: Vec<Option<Cell>> = vec![None; cell_count];
    for (i, raw) in raw_cells.into_iter().enumerate().rev() {
        let refs = raw
            .refs
            .iter()
            .map(|child| built[*child].clone().ok_or(CellError::InvalidBoc("reference order")))
            .collect::<Result<Vec<_>, _>>()?;
        built[i] = Some(Cell::new(raw.data, raw.bit_len, refs)?);
    }

    roots
        .into_iter()
        .map(|root| built[root].clone().ok_or(CellError::InvalidBoc("missing root")))
        .collect()
}
