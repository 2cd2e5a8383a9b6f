//! `HashmapE` with fixed-width unsigned keys and cell references as values.
//!
//! Serialization is canonical: the same entries always produce the same
//! edge tree, each label encoded with the shortest of the three label forms.

use std::collections::BTreeMap;

use common_errors::CellError;

use crate::{Builder, Cell, Slice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    key_bits: usize,
    entries: BTreeMap<u64, Cell>,
}

impl Dictionary {
    pub fn new(key_bits: usize) -> Self {
        Dictionary {
            key_bits,
            entries: BTreeMap::new(),
        }
    }

    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: u64) -> Option<&Cell> {
        self.entries.get(&key)
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Fails when `key` does not fit into the dictionary's key width.
    pub fn insert(&mut self, key: u64, value: Cell) -> Result<Option<Cell>, CellError> {
        if self.key_bits < 64 && key >> self.key_bits != 0 {
            return Err(CellError::ValueDoesNotFit {
                bits: self.key_bits,
            });
        }
        Ok(self.entries.insert(key, value))
    }

    pub fn remove(&mut self, key: u64) -> Option<Cell> {
        self.entries.remove(&key)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Cell)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }
}

fn key_to_bits(key: u64, key_bits: usize) -> Vec<bool> {
    (0..key_bits)
        .rev()
        .map(|i| i < 64 && (key >> i) & 1 == 1)
        .collect()
}

fn bits_to_key(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, bit| (acc << 1) | *bit as u64)
}

/// Width of the length field for labels of at most `max_len` bits.
fn len_bits(max_len: usize) -> usize {
    (usize::BITS - max_len.leading_zeros()) as usize
}

pub(crate) fn serialize_root(dict: &Dictionary) -> Result<Option<Cell>, CellError> {
    if dict.is_empty() {
        return Ok(None);
    }
    let entries: Vec<(Vec<bool>, Cell)> = dict
        .entries
        .iter()
        .map(|(key, value)| (key_to_bits(*key, dict.key_bits), value.clone()))
        .collect();
    serialize_edge(&entries, dict.key_bits).map(Some)
}

// A leaf stores its whole remaining key as the label and the value as a
// reference. A fork stores the common prefix, then the `0` branch and the
// `1` branch.
fn serialize_edge(entries: &[(Vec<bool>, Cell)], remaining: usize) -> Result<Cell, CellError> {
    let mut builder = Builder::new();

    if let [(key, value)] = entries {
        write_label(&mut builder, key, remaining)?;
        builder.store_ref(value.clone())?;
        return builder.build();
    }

    let prefix_len = common_prefix_len(entries);
    write_label(&mut builder, &entries[0].0[..prefix_len], remaining)?;

    let (left, right): (Vec<_>, Vec<_>) = entries
        .iter()
        .map(|(key, value)| (key[prefix_len], key[prefix_len + 1..].to_vec(), value.clone()))
        .partition(|(bit, _, _)| !*bit);
    let strip = |side: Vec<(bool, Vec<bool>, Cell)>| -> Vec<(Vec<bool>, Cell)> {
        side.into_iter().map(|(_, key, value)| (key, value)).collect()
    };

    let child_len = remaining - prefix_len - 1;
    builder.store_ref(serialize_edge(&strip(left), child_len)?)?;
    builder.store_ref(serialize_edge(&strip(right), child_len)?)?;
    builder.build()
}

fn common_prefix_len(entries: &[(Vec<bool>, Cell)]) -> usize {
    let first = &entries[0].0;
    let mut len = first.len();
    for (key, _) in &entries[1..] {
        len = first
            .iter()
            .zip(key.iter())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    len
}

enum LabelForm {
    Short,
    Long,
    Same(bool),
}

fn write_label(builder: &mut Builder, label: &[bool], max_len: usize) -> Result<(), CellError> {
    let k = len_bits(max_len);
    let short = 2 + 2 * label.len();
    let long = 2 + k + label.len();

    let mut form = LabelForm::Short;
    let mut best = short;
    if long < best {
        form = LabelForm::Long;
        best = long;
    }
    if let Some(first) = label.first() {
        if label.iter().all(|bit| bit == first) && 3 + k < best {
            form = LabelForm::Same(*first);
        }
    }

    match form {
        LabelForm::Short => {
            builder.store_bit(false)?;
            for _ in 0..label.len() {
                builder.store_bit(true)?;
            }
            builder.store_bit(false)?;
            for bit in label {
                builder.store_bit(*bit)?;
            }
        },
        LabelForm::Long => {
            builder.store_bit(true)?.store_bit(false)?;
            builder.store_u64(label.len() as u64, k)?;
            for bit in label {
                builder.store_bit(*bit)?;
            }
        },
        LabelForm::Same(value) => {
            builder.store_bit(true)?.store_bit(true)?.store_bit(value)?;
            builder.store_u64(label.len() as u64, k)?;
        },
    }
    Ok(())
}

fn read_label(slice: &mut Slice, max_len: usize) -> Result<Vec<bool>, CellError> {
    let k = len_bits(max_len);

    let (len, same) = if !slice.load_bit()? {
        let mut len = 0;
        while slice.load_bit()? {
            len += 1;
        }
        (len, None)
    } else if !slice.load_bit()? {
        (slice.load_u64(k)? as usize, None)
    } else {
        let value = slice.load_bit()?;
        (slice.load_u64(k)? as usize, Some(value))
    };

    if len > max_len {
        return Err(CellError::InvalidDictionary);
    }

    match same {
        Some(value) => Ok(vec![value; len]),
        None => (0..len).map(|_| slice.load_bit()).collect(),
    }
}

pub(crate) fn parse_root(root: &Cell, key_bits: usize) -> Result<Dictionary, CellError> {
    let mut dict = Dictionary::new(key_bits);
    parse_edge(root, key_bits, Vec::new(), &mut dict.entries)?;
    Ok(dict)
}

fn parse_edge(
    cell: &Cell,
    remaining: usize,
    mut prefix: Vec<bool>,
    out: &mut BTreeMap<u64, Cell>,
) -> Result<(), CellError> {
    let mut slice = cell.parse();
    let label = read_label(&mut slice, remaining)?;
    let rest = remaining - label.len();
    prefix.extend(label);

    if rest == 0 {
        let value = slice.load_ref()?;
        slice.end_parse()?;
        out.insert(bits_to_key(&prefix), value);
        return Ok(());
    }

    let left = slice.load_ref()?;
    let right = slice.load_ref()?;
    slice.end_parse()?;

    let mut left_key = prefix.clone();
    left_key.push(false);
    parse_edge(&left, rest - 1, left_key, out)?;

    prefix.push(true);
    parse_edge(&right, rest - 1, prefix, out)
}
