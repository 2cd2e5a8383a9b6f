use std::collections::BTreeMap;

use common_cells::{Builder, Cell, CellError, CellPack, CellUnpack, Dictionary, FormatError};
use common_constants::{
    DECIMALS_BITS, PERCENT_BITS, PRICE_BITS, RESERVE_ACCUMULATOR_BITS, RESERVE_ID_BITS,
};
use num_bigint::BigUint;

/// Per-reserve inputs the user contract needs to value a position: factors,
/// current accumulators and an 8-decimal price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePerReserve {
    pub decimals: u8,
    pub borrow_factor: u8,
    pub collateral_factor: u8,
    pub lending_accumulator: BigUint,
    pub debt_accumulator: BigUint,
    pub price: BigUint,
}

impl CellPack for VariablePerReserve {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_u64(self.decimals.into(), DECIMALS_BITS)?
            .store_u64(self.borrow_factor.into(), PERCENT_BITS)?
            .store_u64(self.collateral_factor.into(), PERCENT_BITS)?
            .store_uint(&self.lending_accumulator, RESERVE_ACCUMULATOR_BITS)?
            .store_uint(&self.debt_accumulator, RESERVE_ACCUMULATOR_BITS)?
            .store_uint(&self.price, PRICE_BITS)?
            .build()
    }
}

impl CellUnpack for VariablePerReserve {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let variables = VariablePerReserve {
            decimals: slice.load_u64(DECIMALS_BITS)? as u8,
            borrow_factor: slice.load_u64(PERCENT_BITS)? as u8,
            collateral_factor: slice.load_u64(PERCENT_BITS)? as u8,
            lending_accumulator: slice.load_uint(RESERVE_ACCUMULATOR_BITS)?,
            debt_accumulator: slice.load_uint(RESERVE_ACCUMULATOR_BITS)?,
            price: slice.load_uint(PRICE_BITS)?,
        };
        slice.end_parse()?;
        Ok(variables)
    }
}

/// Reserve ids stay below 32, where signed and unsigned 6-bit keys share
/// the same bit pattern.
pub fn pack_variables_per_reserve(
    variables: &BTreeMap<u8, VariablePerReserve>,
) -> Result<Dictionary, CellError> {
    let mut dict = Dictionary::new(RESERVE_ID_BITS);
    for (reserve_id, entry) in variables {
        dict.insert(u64::from(*reserve_id), entry.pack()?)?;
    }
    Ok(dict)
}

pub fn unpack_variables_per_reserve(
    dict: &Dictionary,
) -> Result<BTreeMap<u8, VariablePerReserve>, FormatError> {
    dict.iter()
        .map(|(reserve_id, cell)| Ok((reserve_id as u8, VariablePerReserve::unpack(cell)?)))
        .collect()
}

/// Result of the user contract's `fetch_collateral_data` getter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateralData {
    pub total_discounted_face_deposit: BigUint,
    pub total_collateral_required: BigUint,
}
