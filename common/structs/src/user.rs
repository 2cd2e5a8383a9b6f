use std::collections::BTreeMap;

use common_cells::{
    Address, Builder, Cell, CellError, CellPack, CellUnpack, Dictionary, FormatError,
};
use common_constants::{RAW_BALANCE_BITS, RESERVE_ID_BITS};
use num_bigint::BigUint;
use num_traits::Zero;

use crate::TxLocks;

/// Raw balance per reserve id.
pub type RawBalances = BTreeMap<u8, BigUint>;

/// First half of the user storage: identity, balances and code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserVars {
    pub owner: Address,
    pub master: Address,
    pub raw_deposits: RawBalances,
    pub raw_debts: RawBalances,
    pub user_code: Cell,
    pub additional_data: Option<Cell>,
}

impl UserVars {
    pub fn raw_deposit(&self, reserve_id: u8) -> BigUint {
        self.raw_deposits
            .get(&reserve_id)
            .cloned()
            .unwrap_or_else(BigUint::zero)
    }

    pub fn raw_debt(&self, reserve_id: u8) -> BigUint {
        self.raw_debts
            .get(&reserve_id)
            .cloned()
            .unwrap_or_else(BigUint::zero)
    }
}

pub fn pack_raw_balance(amount: &BigUint) -> Result<Cell, CellError> {
    Builder::new().store_uint(amount, RAW_BALANCE_BITS)?.build()
}

pub fn unpack_raw_balance(cell: &Cell) -> Result<BigUint, FormatError> {
    let mut slice = cell.parse();
    let amount = slice.load_uint(RAW_BALANCE_BITS)?;
    slice.end_parse()?;
    Ok(amount)
}

/// 6-bit keyed dictionary of `uint128` cells.
pub fn pack_raw_balances(balances: &RawBalances) -> Result<Dictionary, CellError> {
    let mut dict = Dictionary::new(RESERVE_ID_BITS);
    for (reserve_id, amount) in balances {
        dict.insert(u64::from(*reserve_id), pack_raw_balance(amount)?)?;
    }
    Ok(dict)
}

pub fn unpack_raw_balances(dict: &Dictionary) -> Result<RawBalances, FormatError> {
    dict.iter()
        .map(|(reserve_id, cell)| Ok((reserve_id as u8, unpack_raw_balance(cell)?)))
        .collect()
}

impl CellPack for UserVars {
    fn pack(&self) -> Result<Cell, CellError> {
        Builder::new()
            .store_address(&self.owner)?
            .store_address(&self.master)?
            .store_dict(&pack_raw_balances(&self.raw_deposits)?)?
            .store_dict(&pack_raw_balances(&self.raw_debts)?)?
            .store_ref(self.user_code.clone())?
            .store_maybe_ref(self.additional_data.clone())?
            .build()
    }
}

impl CellUnpack for UserVars {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let owner = slice.load_address()?;
        let master = slice.load_address()?;
        let deposits = slice.load_dict(RESERVE_ID_BITS)?;
        let debts = slice.load_dict(RESERVE_ID_BITS)?;
        let user_code = slice.load_ref()?;
        let additional_data = slice.load_maybe_ref()?;
        slice.end_parse()?;

        Ok(UserVars {
            owner,
            master,
            raw_deposits: unpack_raw_balances(&deposits)?,
            raw_debts: unpack_raw_balances(&debts)?,
            user_code,
            additional_data,
        })
    }
}

/// Full user contract storage: `^UserVars ^(^TxLocks)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserState {
    pub vars: UserVars,
    pub tx_locks: TxLocks,
}

impl UserState {
    /// Storage a freshly deployed user contract starts with.
    pub fn initial(owner: Address, master: Address, user_code: Cell) -> Self {
        UserState {
            vars: UserVars {
                owner,
                master,
                raw_deposits: RawBalances::new(),
                raw_debts: RawBalances::new(),
                user_code,
                additional_data: None,
            },
            tx_locks: TxLocks::initial(),
        }
    }
}

impl CellPack for UserState {
    fn pack(&self) -> Result<Cell, CellError> {
        let locks_holder = Builder::new().store_ref(self.tx_locks.pack()?)?.build()?;
        Builder::new()
            .store_ref(self.vars.pack()?)?
            .store_ref(locks_holder)?
            .build()
    }
}

impl CellUnpack for UserState {
    fn unpack(cell: &Cell) -> Result<Self, FormatError> {
        let mut slice = cell.parse();
        let vars = slice.load_ref()?;
        let locks_holder = slice.load_ref()?;
        slice.end_parse()?;

        let mut holder = locks_holder.parse();
        let tx_locks = holder.load_ref()?;
        holder.end_parse()?;

        Ok(UserState {
            vars: UserVars::unpack(&vars)?,
            tx_locks: TxLocks::unpack(&tx_locks)?,
        })
    }
}
