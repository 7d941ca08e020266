//! # Strategy Vault Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Wired vault + in-memory collaborators
//! │
//! ├── exploits/         # Attack simulations
//! │   ├── reentrancy.rs # Strategies calling back into the vault
//! │   ├── misbehaving.rs# Short/over delivery, failing requests, moving valuations
//! │   └── inflation.rs  # Donation-based share price manipulation
//! │
//! └── integration/      # End-to-end vault flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p vault-tests
//!
//! # By category
//! cargo test -p vault-tests integration::
//! cargo test -p vault-tests exploits::
//!
//! # Verbose vault logs
//! RUST_LOG=strategy_vault=debug cargo test -p vault-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p vault-tests
//! ```
