//! Deterministic contract address derivation.
//!
//! A contract address is workchain 0 plus the hash of its state init
//! `split_depth:0 special:0 code:(Maybe ^Cell) data:(Maybe ^Cell) library:0`.

use common_cells::{Address, Builder, Cell, CellError, CellPack};
use common_constants::{BASECHAIN, VARIANT_BITS, VERSION_BITS};

use crate::UserState;

pub fn state_init(code: &Cell, data: &Cell) -> Result<Cell, CellError> {
    Builder::new()
        .store_u64(0, 2)?
        .store_maybe_ref(Some(code.clone()))?
        .store_maybe_ref(Some(data.clone()))?
        .store_u64(0, 1)?
        .build()
}

pub fn address_from_state_init(state_init: &Cell) -> Address {
    Address::new(BASECHAIN, state_init.hash())
}

/// State init of a user contract deployed by `master` for `owner`.
pub fn user_state_init(owner: &Address, master: &Address, user_code: &Cell) -> Result<Cell, CellError> {
    let data = UserState::initial(*owner, *master, user_code.clone()).pack()?;
    state_init(user_code, &data)
}

pub fn user_address(owner: &Address, master: &Address, user_code: &Cell) -> Result<Address, CellError> {
    Ok(address_from_state_init(&user_state_init(owner, master, user_code)?))
}

pub fn owner_upgradable_data(
    owner: &Address,
    master: &Address,
    version: u16,
    variant: u8,
) -> Result<Cell, CellError> {
    Builder::new()
        .store_address(owner)?
        .store_address(master)?
        .store_u64(version.into(), VERSION_BITS)?
        .store_u64(variant.into(), VARIANT_BITS)?
        .build()
}

pub fn owner_upgradable_state_init(
    owner: &Address,
    master: &Address,
    code: &Cell,
    version: u16,
    variant: u8,
) -> Result<Cell, CellError> {
    state_init(code, &owner_upgradable_data(owner, master, version, variant)?)
}

/// Addresses only depend on the deployment parameters, so version and
/// variant are always 0 here.
pub fn owner_upgradable_address(owner: &Address, master: &Address, code: &Cell) -> Result<Address, CellError> {
    Ok(address_from_state_init(&owner_upgradable_state_init(
        owner, master, code, 0, 0,
    )?))
}
