//! # Domain Errors
//!
//! Error types for the vault engine and its collaborators.
//!
//! `VaultError` wraps `StrategyError` and `LedgerError` so failures raised by
//! strategies or ledgers reach the caller unchanged.

use super::value_objects::{Address, Bps, RequestId, Role};
use thiserror::Error;

/// Errors raised by a strategy backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    /// The operation does not exist for this liquidity class.
    #[error("Operation not supported by this strategy: {operation}")]
    Unsupported {
        /// Operation name
        operation: &'static str,
    },

    /// Request exists but its unlock time has not passed.
    #[error("Request {request_id} not claimable until {unlock_at} (now {now})")]
    NotYetClaimable {
        /// Request id
        request_id: RequestId,
        /// Unlock timestamp
        unlock_at: u64,
        /// Current timestamp
        now: u64,
    },

    /// Request already settled.
    #[error("Request {0} already claimed")]
    AlreadyClaimed(RequestId),

    /// Request never issued by this strategy.
    #[error("Request {0} not found")]
    RequestNotFound(RequestId),

    /// Request belongs to another account.
    #[error("Request {0} not owned by caller")]
    NotRequestOwner(RequestId),

    /// Position too small for the operation.
    #[error("Insufficient strategy balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Requested amount
        requested: u128,
        /// Available amount
        available: u128,
    },

    /// Underlying asset movement failed.
    #[error("Asset ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Backend-specific failure.
    #[error("Strategy failure: {0}")]
    Other(String),
}

/// Errors raised by the asset or shares ledger.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Balance too low.
    #[error("Insufficient balance for {account:?}: required {required}, available {available}")]
    InsufficientBalance {
        /// Debited account
        account: Address,
        /// Required amount
        required: u128,
        /// Available amount
        available: u128,
    },

    /// Allowance too low.
    #[error("Insufficient allowance from {owner:?} to {spender:?}: required {required}, available {available}")]
    InsufficientAllowance {
        /// Allowance owner
        owner: Address,
        /// Allowance spender
        spender: Address,
        /// Required amount
        required: u128,
        /// Available amount
        available: u128,
    },

    /// Balance or supply would exceed `u128::MAX`.
    #[error("Ledger arithmetic overflow")]
    Overflow,
}

/// Failure category, mirroring how callers are expected to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller-correctable configuration input.
    Configuration,
    /// Not enough liquidity; retry later or reduce the amount.
    Liquidity,
    /// Caller lacks rights or references something unknown.
    Access,
    /// Vault state forbids the call (paused, re-entered).
    Operational,
    /// Collaborator failure passed through unchanged.
    External,
    /// Checked arithmetic failed or an amount rounded to zero.
    Arithmetic,
}

/// Vault error types.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    /// Strategy's underlying asset differs from the vault's.
    #[error("Asset mismatch: vault {expected:?}, strategy {actual:?}")]
    AssetMismatch {
        /// Vault asset
        expected: Address,
        /// Strategy asset
        actual: Address,
    },

    /// Weight array length differs from the entry count.
    #[error("Length mismatch: {expected} entries, {actual} weights")]
    LengthMismatch {
        /// Entry count
        expected: usize,
        /// Supplied weights
        actual: usize,
    },

    /// Allocation requested on an empty table.
    #[error("No strategies configured")]
    NoStrategies,

    /// Weight above the entry's cap.
    #[error("Cap exceeded for strategy {index}: weight {weight} > cap {cap}")]
    CapExceeded {
        /// Entry index
        index: usize,
        /// Requested weight
        weight: Bps,
        /// Entry cap
        cap: Bps,
    },

    /// Weights do not sum to exactly 10000.
    #[error("Weight sum invalid: {sum} != 10000")]
    WeightSumInvalid {
        /// Actual sum
        sum: u32,
    },

    /// Cap above 10000 bps.
    #[error("Cap out of range: {cap} > 10000")]
    CapOutOfRange {
        /// Requested cap
        cap: Bps,
    },

    /// Strategy already present in the table.
    #[error("Strategy already registered: {0:?}")]
    DuplicateStrategy(Address),

    /// Table is full.
    #[error("Too many strategies: max {max}")]
    TooManyStrategies {
        /// Configured maximum
        max: usize,
    },

    /// Entry index out of range.
    #[error("Unknown strategy index: {0}")]
    UnknownStrategy(usize),

    /// Idle + instant + locked sources cannot cover the request.
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        /// Requested assets
        requested: u128,
        /// Assets the plan could source
        available: u128,
    },

    /// Instant strategy delivered less than it reported as available.
    #[error("Strategy {strategy:?} delivered {delivered} of {requested}")]
    StrategyShortfall {
        /// Strategy address
        strategy: Address,
        /// Planned pull
        requested: u128,
        /// Measured delivery
        delivered: u128,
    },

    /// No recorded owner for this request.
    #[error("Unknown request {request_id} on strategy {strategy:?}")]
    UnknownRequest {
        /// Strategy address
        strategy: Address,
        /// Request id
        request_id: RequestId,
    },

    /// A request id already has an open ownership record.
    #[error("Request {request_id} on strategy {strategy:?} is already open")]
    DuplicateRequest {
        /// Strategy address
        strategy: Address,
        /// Request id
        request_id: RequestId,
    },

    /// Owner's share balance too low.
    #[error("Insufficient shares: required {required}, available {available}")]
    InsufficientShares {
        /// Shares needed
        required: u128,
        /// Shares held
        available: u128,
    },

    /// Caller's allowance from owner too low.
    #[error("Insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance {
        /// Shares needed
        required: u128,
        /// Allowance granted
        available: u128,
    },

    /// Caller lacks the role.
    #[error("Unauthorized: {account:?} lacks {role} role")]
    Unauthorized {
        /// Required role
        role: Role,
        /// Caller
        account: Address,
    },

    /// Asset movement is paused.
    #[error("Vault paused")]
    Paused,

    /// Re-entrant call while another vault operation is in progress.
    #[error("Reentrant call rejected")]
    Reentrancy,

    /// Zero amount requested or conversion rounded to zero.
    #[error("Zero amount")]
    ZeroAmount,

    /// Checked arithmetic failed.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Strategy failure, passed through unchanged.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Ledger failure, passed through unchanged.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl VaultError {
    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AssetMismatch { .. }
            | Self::LengthMismatch { .. }
            | Self::NoStrategies
            | Self::CapExceeded { .. }
            | Self::WeightSumInvalid { .. }
            | Self::CapOutOfRange { .. }
            | Self::DuplicateStrategy(_)
            | Self::TooManyStrategies { .. }
            | Self::UnknownStrategy(_) => ErrorCategory::Configuration,
            Self::InsufficientLiquidity { .. } | Self::StrategyShortfall { .. } => {
                ErrorCategory::Liquidity
            }
            Self::UnknownRequest { .. }
            | Self::InsufficientShares { .. }
            | Self::InsufficientAllowance { .. }
            | Self::Unauthorized { .. } => ErrorCategory::Access,
            Self::Paused | Self::Reentrancy | Self::DuplicateRequest { .. } => {
                ErrorCategory::Operational
            }
            Self::ZeroAmount | Self::ArithmeticOverflow => ErrorCategory::Arithmetic,
            Self::Strategy(_) | Self::Ledger(_) => ErrorCategory::External,
        }
    }
}
