//! # Domain Module
//!
//! Core domain types for the vault: allocation table, claim registry,
//! events, errors and value objects.

pub mod entities;
pub mod errors;
pub mod events;
pub mod invariants;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use invariants::*;
pub use value_objects::*;
