use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use common_constants::{MAX_CELL_BITS, MAX_CELL_REFS};
use common_errors::CellError;
use sha2::{Digest, Sha256};

use crate::{boc, Slice};

/// Immutable ordinary cell. Clones share the same node.
///
/// Equality is content equality: two cells are equal when their
/// representation hashes are.
#[derive(Clone)]
pub struct Cell(Arc<CellInner>);

struct CellInner {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Cell>,
    depth: u16,
    hash: [u8; 32],
}

impl Cell {
    /// `data` must be `ceil(bit_len / 8)` bytes with every bit past
    /// `bit_len` cleared.
    pub(crate) fn new(data: Vec<u8>, bit_len: usize, refs: Vec<Cell>) -> Result<Self, CellError> {
        if bit_len > MAX_CELL_BITS {
            return Err(CellError::BitsOverflow { requested: bit_len });
        }
        if refs.len() > MAX_CELL_REFS {
            return Err(CellError::RefsOverflow);
        }

        let depth = refs
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0);

        let mut inner = CellInner {
            data,
            bit_len,
            refs,
            depth,
            hash: [0u8; 32],
        };
        inner.hash = inner.representation_hash();

        Ok(Cell(Arc::new(inner)))
    }

    pub fn empty() -> Self {
        Cell(Arc::new(CellInner::empty()))
    }

    pub fn bit_len(&self) -> usize {
        self.0.bit_len
    }

    pub fn data(&self) -> &[u8] {
        &self.0.data
    }

    pub fn refs(&self) -> &[Cell] {
        &self.0.refs
    }

    pub fn reference(&self, index: usize) -> Option<&Cell> {
        self.0.refs.get(index)
    }

    pub fn depth(&self) -> u16 {
        self.0.depth
    }

    pub fn hash(&self) -> [u8; 32] {
        self.0.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.0.hash)
    }

    pub fn is_empty(&self) -> bool {
        self.0.bit_len == 0 && self.0.refs.is_empty()
    }

    pub fn parse(&self) -> Slice {
        Slice::new(self.clone())
    }

    /// Single-root bag of cells with a CRC32C trailer.
    pub fn to_boc(&self) -> Vec<u8> {
        boc::serialize_boc(self)
    }

    pub fn to_boc_hex(&self) -> String {
        hex::encode(self.to_boc())
    }

    /// Reads a bag of cells holding exactly one root.
    pub fn from_boc(bytes: &[u8]) -> Result<Self, CellError> {
        let mut roots = boc::deserialize_boc(bytes)?;
        if roots.len() != 1 {
            return Err(CellError::InvalidBoc("expected a single root"));
        }
        roots.pop().ok_or(CellError::InvalidBoc("no roots"))
    }

    pub fn from_boc_hex(encoded: &str) -> Result<Self, CellError> {
        let bytes = hex::decode(encoded).map_err(|_| CellError::InvalidBoc("not hex"))?;
        Self::from_boc(&bytes)
    }

    pub(crate) fn descriptors(&self) -> [u8; 2] {
        self.0.descriptors()
    }

    pub(crate) fn augmented_data(&self) -> Vec<u8> {
        self.0.augmented_data()
    }
}

impl CellInner {
    fn empty() -> Self {
        let mut inner = CellInner {
            data: Vec::new(),
            bit_len: 0,
            refs: Vec::new(),
            depth: 0,
            hash: [0u8; 32],
        };
        inner.hash = inner.representation_hash();
        inner
    }

    // d1 = refs + 8 * exotic + 32 * level; ordinary level-0 cells only.
    // d2 = floor(bits / 8) + ceil(bits / 8)
    fn descriptors(&self) -> [u8; 2] {
        let d1 = self.refs.len() as u8;
        let d2 = (self.bit_len / 8 + self.bit_len.div_ceil(8)) as u8;
        [d1, d2]
    }

    /// Data bytes with the completion tag appended to a partial last byte.
    fn augmented_data(&self) -> Vec<u8> {
        let mut bytes = self.data.clone();
        let rem = self.bit_len % 8;
        if rem != 0 {
            if let Some(last) = bytes.last_mut() {
                *last |= 0x80 >> rem;
            }
        }
        bytes
    }

    fn representation_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.descriptors());
        hasher.update(self.augmented_data());
        for child in &self.refs {
            hasher.update(child.depth().to_be_bytes());
        }
        for child in &self.refs {
            hasher.update(child.hash());
        }
        hasher.finalize().into()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::empty()
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.0.bit_len)
            .field("refs", &self.0.refs.len())
            .field("hash", &self.hash_hex())
            .finish()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.0.bit_len % 8 == 0 { "" } else { "_" };
        write!(f, "x{{{}{tag}}}", hex::encode_upper(self.augmented_data()))
    }
}
