use core::{fmt, str::FromStr};

use common_errors::CellError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Internal contract address: workchain plus 256-bit account hash.
///
/// Text form is the raw `workchain:hex` notation, e.g.
/// `0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub workchain: i8,
    pub hash: [u8; 32],
}

impl Address {
    /// `10` + anycast bit + 8-bit workchain + 256-bit hash.
    pub const BIT_LEN: usize = 2 + 1 + 8 + 256;

    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Address { workchain, hash }
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, self.hash_hex())
    }
}

impl FromStr for Address {
    type Err = CellError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (workchain, hash) = raw
            .split_once(':')
            .ok_or_else(|| CellError::InvalidAddress(format!("expected wc:hex, got {raw:?}")))?;

        let workchain = workchain
            .parse::<i8>()
            .map_err(|_| CellError::InvalidAddress(format!("bad workchain {workchain:?}")))?;

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hash, &mut bytes)
            .map_err(|_| CellError::InvalidAddress(format!("bad account hash {hash:?}")))?;

        Ok(Address::new(workchain, bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
