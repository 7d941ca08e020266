//! Application layer: the vault service and its unit of work.

pub mod service;
pub mod transaction;

pub use service::{StrategyVault, VaultPorts};
pub use transaction::VaultTransaction;
