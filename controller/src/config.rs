use std::{collections::BTreeSet, fs, path::Path};

use common_cells::{Address, Cell};
use common_constants::RESERVE_ID_BITS;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ConfigError, Error},
    oracle::OracleAttestation,
};

/// Everything that differs between two deployments of the protocol.
///
/// Loaded from TOML and handed to whoever needs it; there is no process-wide
/// registry of deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub name: String,
    pub address_book: AddressBook,
    pub reserves: Vec<ReserveEntry>,
    pub fees: FeeSchedule,
    #[serde(default)]
    pub oracle: Option<OracleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    pub master: Address,
    /// Entry point that accepts the native coin in a jetton-transfer shaped body.
    pub native_entry: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveEntry {
    pub id: u8,
    pub symbol: String,
    pub decimals: u8,
    /// `None` for the native coin.
    #[serde(default)]
    pub jetton_minter: Option<Address>,
}

impl ReserveEntry {
    pub fn is_native(&self) -> bool {
        self.jetton_minter.is_none()
    }
}

/// Attached value in nano-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionFee {
    /// Gas attached when the asset is the native coin.
    pub native: u64,
    /// Total attached to a jetton wallet message.
    #[serde(default)]
    pub jetton_total: u64,
    /// Part of `jetton_total` forwarded along with the transfer notification.
    #[serde(default)]
    pub jetton_forward: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub deposit: ActionFee,
    pub withdraw: ActionFee,
    pub borrow: ActionFee,
    pub repay: ActionFee,
    #[serde(default)]
    pub liquidate: ActionFee,
}

/// Oracle configuration the master contract checks signatures against, as
/// bag-of-cells hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    pub config_payload: String,
    pub config_signature: String,
}

impl OracleConfig {
    /// Pairs the configured payload and signature with fresh `price_data`.
    pub fn attestation(&self, price_data: Cell) -> Result<OracleAttestation, ConfigError> {
        Ok(OracleAttestation {
            price_data,
            config_payload: parse_boc_hex(&self.config_payload)?,
            config_signature: parse_boc_hex(&self.config_signature)?,
        })
    }
}

fn parse_boc_hex(encoded: &str) -> Result<Cell, ConfigError> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|err| ConfigError::InvalidOraclePayload(err.to_string()))?;
    Cell::from_boc(&bytes).map_err(|err| ConfigError::InvalidOraclePayload(err.to_string()))
}

impl DeploymentConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeploymentConfig =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        debug!(
            "loaded deployment {} with {} reserves",
            config.name,
            config.reserves.len()
        );
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reserve ids must be unique and fit the 6-bit key width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for reserve in &self.reserves {
            if u32::from(reserve.id) >= 1 << RESERVE_ID_BITS {
                return Err(ConfigError::ReserveIdOutOfRange(reserve.id));
            }
            if !seen.insert(reserve.id) {
                return Err(ConfigError::DuplicateReserve(reserve.id));
            }
        }
        Ok(())
    }

    pub fn reserve(&self, reserve_id: u8) -> Result<&ReserveEntry, Error> {
        self.reserves
            .iter()
            .find(|reserve| reserve.id == reserve_id)
            .ok_or(Error::UnknownReserve(reserve_id))
    }

    pub fn reserve_by_symbol(&self, symbol: &str) -> Option<&ReserveEntry> {
        self.reserves
            .iter()
            .find(|reserve| reserve.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn reserve_ids(&self) -> Vec<u8> {
        self.reserves.iter().map(|reserve| reserve.id).collect()
    }
}
