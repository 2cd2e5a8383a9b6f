pub mod account;
pub mod collateralization;

pub use account::AccountHealth;
pub use collateralization::{BorrowTarget, CollateralInfo, Collateralization, DebtInfo};
