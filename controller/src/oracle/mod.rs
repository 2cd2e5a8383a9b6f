use std::collections::BTreeMap;

use common_cells::Cell;
use log::debug;
use num_bigint::BigUint;

use crate::errors::Error;

pub mod median;

pub use median::median;

/// One signed price observation for a reserve, 8 decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeed {
    pub reserve_id: u8,
    pub price_8dec: BigUint,
}

/// Oracle data the master contract verifies before a withdraw, borrow or
/// liquidation. All three parts are opaque to this library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleAttestation {
    pub price_data: Cell,
    pub config_payload: Cell,
    pub config_signature: Cell,
}

/// Collects observations per reserve and reduces them to medians, the same
/// way the master contract does on chain.
#[derive(Debug, Clone, Default)]
pub struct MedianPricesBuilder {
    prices: BTreeMap<u8, Vec<BigUint>>,
}

impl MedianPricesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_price(&mut self, reserve_id: u8, price_8dec: BigUint) -> &mut Self {
        self.prices.entry(reserve_id).or_default().push(price_8dec);
        self
    }

    pub fn add_feed(&mut self, feed: PriceFeed) -> &mut Self {
        self.add_price(feed.reserve_id, feed.price_8dec)
    }

    /// Medians for every reserve in `required`.
    ///
    /// # Errors
    /// - `Error::MissingPrice` for the first required reserve without observations.
    pub fn build(&self, required: &[u8]) -> Result<BTreeMap<u8, BigUint>, Error> {
        let mut medians = BTreeMap::new();
        for reserve_id in required {
            let mut observations = self.prices.get(reserve_id).cloned().unwrap_or_default();
            let price = median(&mut observations).ok_or(Error::MissingPrice(*reserve_id))?;
            debug!(
                "reserve {reserve_id}: median {price} of {} observations",
                observations.len()
            );
            medians.insert(*reserve_id, price);
        }
        Ok(medians)
    }
}
