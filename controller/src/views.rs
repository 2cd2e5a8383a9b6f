//! Typed getters of the master and user contracts.

use std::collections::BTreeMap;

use common_cells::{Address, Builder, CellUnpack};
use common_humanizer::bool_humanizer;
use common_structs::{
    pack_variables_per_reserve, CollateralData, ReserveState, TxLocks, UserVars,
    VariablePerReserve,
};
use log::debug;
use num_bigint::BigUint;

use crate::{
    cache::ReserveCache,
    chain::{ChainReader, ChainWriter, StackReader, StackValue},
    errors::{ChainError, Error},
    messages::OutboundMessage,
};

fn call<R: ChainReader>(
    reader: &R,
    address: &Address,
    method: &str,
    args: &[StackValue],
) -> Result<StackReader, Error> {
    debug!("{method} on {address}");
    let stack = reader.run_get_method(address, method, args)?;
    Ok(StackReader::new(method, stack))
}

fn reserve_arg(reserve_id: u8) -> [StackValue; 1] {
    [StackValue::int(reserve_id)]
}

/// Read access to the master contract of a deployment.
#[derive(Debug, Clone, Copy)]
pub struct MasterContract<'a, R> {
    reader: &'a R,
    address: Address,
}

impl<'a, R: ChainReader> MasterContract<'a, R> {
    pub fn new(reader: &'a R, address: Address) -> Self {
        MasterContract { reader, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn fetch_reserve(&self, reserve_id: u8) -> Result<ReserveState, Error> {
        let mut stack = call(
            self.reader,
            &self.address,
            "fetch_reserve",
            &reserve_arg(reserve_id),
        )?;
        let reserve = ReserveState::unpack(&stack.read_cell()?)?;
        debug!(
            "reserve {reserve_id}: last update {}, available {}, debt {}",
            reserve.accumulators.last_update_timestamp,
            reserve.totals.total_raw_available,
            reserve.totals.total_raw_debt
        );
        Ok(reserve)
    }

    /// Fetches `reserve_ids` and pins each to `timestamp`.
    pub fn fetch_reserve_caches(
        &self,
        reserve_ids: &[u8],
        timestamp: u64,
    ) -> Result<BTreeMap<u8, ReserveCache>, Error> {
        reserve_ids
            .iter()
            .map(|&reserve_id| {
                let reserve = self.fetch_reserve(reserve_id)?;
                Ok((reserve_id, ReserveCache::new(reserve_id, reserve, timestamp)?))
            })
            .collect()
    }

    /// Version expected in deposit, repay and liquidate payloads.
    pub fn fetch_version(&self) -> Result<u16, Error> {
        let mut stack = call(self.reader, &self.address, "fetch_version", &[])?;
        let version = stack.read_u64()?;
        u16::try_from(version).map_err(|_| {
            Error::from(ChainError::UnexpectedStackEntry {
                method: "fetch_version".to_owned(),
                expected: "14-bit version",
            })
        })
    }

    /// Lending accumulator as the contract projects it to the current block.
    pub fn fetch_latest_lending_accumulator(&self, reserve_id: u8) -> Result<BigUint, Error> {
        let mut stack = call(
            self.reader,
            &self.address,
            "fetch_latest_lending_accumulator",
            &reserve_arg(reserve_id),
        )?;
        Ok(stack.read_uint()?)
    }

    pub fn fetch_latest_debt_accumulator(&self, reserve_id: u8) -> Result<BigUint, Error> {
        let mut stack = call(
            self.reader,
            &self.address,
            "fetch_latest_debt_accumulator",
            &reserve_arg(reserve_id),
        )?;
        Ok(stack.read_uint()?)
    }

    /// Address of the user contract belonging to `owner`.
    pub fn fetch_user_address(&self, owner: &Address) -> Result<Address, Error> {
        let args = [StackValue::address(owner)?];
        let mut stack = call(self.reader, &self.address, "fetch_blubbo_user_address", &args)?;
        let user = stack.read_address()?;
        debug!("user contract of {owner} is {user}");
        Ok(user)
    }

    pub fn user_contract(&self, owner: &Address) -> Result<UserContract<'a, R>, Error> {
        Ok(UserContract::new(self.reader, self.fetch_user_address(owner)?))
    }
}

/// Read access to one user contract.
#[derive(Debug, Clone, Copy)]
pub struct UserContract<'a, R> {
    reader: &'a R,
    address: Address,
}

impl<'a, R: ChainReader> UserContract<'a, R> {
    pub fn new(reader: &'a R, address: Address) -> Self {
        UserContract { reader, address }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn fetch_storage(&self) -> Result<UserVars, Error> {
        let mut stack = call(self.reader, &self.address, "fetch_storage", &[])?;
        let vars = UserVars::unpack(&stack.read_cell()?)?;
        debug!(
            "user {}: {} deposits, {} debts",
            vars.owner,
            vars.raw_deposits.len(),
            vars.raw_debts.len()
        );
        Ok(vars)
    }

    pub fn fetch_raw_deposit_per_reserve(&self, reserve_id: u8) -> Result<BigUint, Error> {
        let mut stack = call(
            self.reader,
            &self.address,
            "fetch_raw_deposit_per_reserve",
            &reserve_arg(reserve_id),
        )?;
        Ok(stack.read_uint()?)
    }

    pub fn fetch_raw_debt_per_reserve(&self, reserve_id: u8) -> Result<BigUint, Error> {
        let mut stack = call(
            self.reader,
            &self.address,
            "fetch_raw_debt_per_reserve",
            &reserve_arg(reserve_id),
        )?;
        Ok(stack.read_uint()?)
    }

    /// Withdrawal, borrowing, repayment and liquidation locks, each as an
    /// `(id, state)` pair on the stack.
    pub fn fetch_tx_locks(&self) -> Result<TxLocks, Error> {
        let mut stack = call(self.reader, &self.address, "fetch_tx_locks", &[])?;
        let mut pairs = [(0u64, 0u64); 4];
        for pair in pairs.iter_mut() {
            *pair = (stack.read_u64()?, stack.read_u64()?);
        }
        Ok(TxLocks::from_pairs(pairs)?)
    }

    /// Lets the contract value the position with caller-supplied reserve
    /// variables. The dictionary travels wrapped in a cell.
    pub fn fetch_collateral_data(
        &self,
        variables: &BTreeMap<u8, VariablePerReserve>,
        apply_borrow_factor: bool,
    ) -> Result<CollateralData, Error> {
        let dict = pack_variables_per_reserve(variables)?;
        let args = [
            StackValue::Cell(Builder::new().store_dict(&dict)?.build()?),
            StackValue::int(bool_humanizer::from_human(apply_borrow_factor).as_int()),
        ];
        let mut stack = call(self.reader, &self.address, "fetch_collateral_data", &args)?;
        Ok(CollateralData {
            total_discounted_face_deposit: stack.read_uint()?,
            total_collateral_required: stack.read_uint()?,
        })
    }
}

/// Hands `message` to the writer, logging where it goes.
pub fn send<W: ChainWriter>(writer: &W, message: OutboundMessage) -> Result<(), Error> {
    debug!(
        "sending {} nano to {} ({} body bits)",
        message.value,
        message.destination,
        message.body.bit_len()
    );
    writer.send(message)?;
    Ok(())
}
