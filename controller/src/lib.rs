//! Client-side controller of the lending protocol: values positions from
//! fetched reserve and user state, builds the messages a user sends, and
//! reads the contracts through caller-provided chain collaborators.

pub mod cache;
pub mod chain;
pub mod config;
pub mod errors;
pub mod messages;
pub mod oracle;
pub mod positions;
pub mod views;

pub use cache::ReserveCache;
pub use chain::{ChainReader, ChainWriter, StackReader, StackValue};
pub use config::{ActionFee, AddressBook, DeploymentConfig, FeeSchedule, ReserveEntry};
pub use errors::{ChainError, ConfigError, Error};
pub use messages::{AssetSource, ForwardPayload, JettonTransfer, MasterRequest, OutboundMessage};
pub use oracle::{median, MedianPricesBuilder, OracleAttestation, PriceFeed};
pub use positions::{AccountHealth, BorrowTarget, CollateralInfo, Collateralization, DebtInfo};
pub use views::{MasterContract, UserContract};
