use std::collections::BTreeMap;

use common_structs::UserVars;
use log::debug;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::{
    cache::ReserveCache,
    errors::Error,
    positions::{CollateralInfo, Collateralization, DebtInfo},
};

/// Health of one user position at the caches' timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountHealth {
    collaterals: BTreeMap<u8, CollateralInfo>,
    debts: BTreeMap<u8, DebtInfo>,
    collateralization: Collateralization,
}

impl AccountHealth {
    /// Values every non-zero balance of `user`: deposits with their
    /// collateral factor, debts with their borrow factor.
    ///
    /// # Arguments
    /// - `user`: User contract storage.
    /// - `caches`: Reserve caches keyed by reserve id, all pinned to the same timestamp.
    /// - `prices`: 8-decimal USD prices keyed by reserve id.
    ///
    /// # Errors
    /// - `Error::UnknownReserve` when a balance refers to a reserve without a cache.
    /// - `Error::MissingPrice` when a balance refers to a reserve without a price.
    pub fn evaluate(
        user: &UserVars,
        caches: &BTreeMap<u8, ReserveCache>,
        prices: &BTreeMap<u8, BigUint>,
    ) -> Result<Self, Error> {
        let mut health = AccountHealth {
            collaterals: BTreeMap::new(),
            debts: BTreeMap::new(),
            collateralization: Collateralization::new(),
        };

        for (reserve_id, raw_deposit) in &user.raw_deposits {
            if raw_deposit.is_zero() {
                continue;
            }
            let (cache, price) = lookup(*reserve_id, caches, prices)?;
            let info = cache.collateral_info(raw_deposit, price)?;
            health.collateralization.add_collateral(&info)?;
            health.collaterals.insert(*reserve_id, info);
        }

        for (reserve_id, raw_debt) in &user.raw_debts {
            if raw_debt.is_zero() {
                continue;
            }
            let (cache, price) = lookup(*reserve_id, caches, prices)?;
            let info = cache.debt_info(raw_debt, price, true)?;
            health.collateralization.add_debt(&info)?;
            health.debts.insert(*reserve_id, info);
        }

        debug!(
            "position of {}: collateral {} usd, debt {} usd",
            user.owner,
            health.collateralization.discounted_collateral_usd(),
            health.collateralization.debt_usd()
        );
        Ok(health)
    }

    pub fn collateralization(&self) -> &Collateralization {
        &self.collateralization
    }

    pub fn collaterals(&self) -> &BTreeMap<u8, CollateralInfo> {
        &self.collaterals
    }

    pub fn debts(&self) -> &BTreeMap<u8, DebtInfo> {
        &self.debts
    }

    pub fn is_solvent(&self) -> bool {
        self.collateralization.is_solvent()
    }

    pub fn ratio(&self) -> Option<f64> {
        self.collateralization.ratio()
    }

    /// How much more of `cache`'s asset the position can borrow, counting
    /// every current debt. Negative when the position is already
    /// undercollateralized.
    pub fn borrow_capacity(
        &self,
        cache: &ReserveCache,
        price_8dec: &BigUint,
    ) -> Result<BigInt, Error> {
        let collaterals: Vec<CollateralInfo> = self.collaterals.values().cloned().collect();
        let debts: Vec<DebtInfo> = self.debts.values().cloned().collect();
        let target = cache.borrow_target(price_8dec)?;

        Ok(Collateralization::max_borrow_capacity(
            &collaterals,
            &debts,
            &target,
        )?)
    }
}

fn lookup<'a>(
    reserve_id: u8,
    caches: &'a BTreeMap<u8, ReserveCache>,
    prices: &'a BTreeMap<u8, BigUint>,
) -> Result<(&'a ReserveCache, &'a BigUint), Error> {
    let cache = caches
        .get(&reserve_id)
        .ok_or(Error::UnknownReserve(reserve_id))?;
    let price = prices
        .get(&reserve_id)
        .ok_or(Error::MissingPrice(reserve_id))?;
    Ok((cache, price))
}
