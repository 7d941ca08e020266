//! # Strategy Vault
//!
//! Tokenized vault that routes deposits across several yield strategies.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Allocation table of strategies with target and cap weights
//! - Push-only rebalancing of idle capital by target weight
//! - Withdrawal routing: idle first, then instant strategies, then
//!   time-locked requests queued for a later claim
//! - ERC-4626 style share accounting with virtual-offset rounding
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Atomic operations | Plan first, then commit through `VaultTransaction` |
//! | No re-entry | `ReentrantMutex<RefCell<_>>` state guard |
//! | Pending accounting | `pending[owner]` equals the sum of open requests |
//! | Verbatim failures | Strategy and ledger errors wrap into `VaultError` |
//!
//! ## Module Structure
//!
//! ```text
//! strategy-vault/
//! ├── domain/          # AllocationTable, PendingClaimRegistry, events, errors
//! ├── algorithms/      # Share math, valuation, rebalance and withdrawal planning
//! ├── ports/           # VaultApi, StrategyAdapter, ledgers, governance, sinks
//! ├── adapters/        # In-memory ledgers, reference strategies, event sinks
//! ├── application/     # StrategyVault service, VaultTransaction
//! └── config.rs        # VaultConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    InMemoryAccessControl, InMemoryAssetLedger, InMemoryPauseState, InMemorySharesLedger,
    InstantStrategy, LockedStrategy, ManualClock, NoOpEventSink, RecordingEventSink, SystemClock,
    TracingEventSink,
};
pub use algorithms::{mul_div, ShareMath, WithdrawalPlan, WAD};
pub use application::{StrategyVault, VaultPorts, VaultTransaction};
pub use config::{ConfigError, VaultConfig};
pub use domain::{
    address_from_low_u64, invariant_pending_consistent, invariant_weight_sum,
    invariant_within_cap, Address, AllocationTable, Bps, ErrorCategory, LedgerError,
    LiquidityClass, PendingClaimRegistry, QueuedWithdrawal, RequestId, Role, Rounding,
    StrategyError, StrategySnapshot, VaultError, VaultEvent, VaultState, WithdrawalReceipt,
    MAX_BPS,
};
pub use ports::{
    AccessControl, AssetLedger, PauseState, PublishError, SharesLedger, StrategyAdapter,
    TimeSource, VaultApi, VaultEventSink,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
