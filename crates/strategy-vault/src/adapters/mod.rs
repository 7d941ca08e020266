//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, used by tests and
//! simulations.

mod event_sink;
mod governance;
mod ledgers;
mod strategies;

pub use event_sink::{NoOpEventSink, RecordingEventSink, TracingEventSink};
pub use governance::{InMemoryAccessControl, InMemoryPauseState, ManualClock, SystemClock};
pub use ledgers::{InMemoryAssetLedger, InMemorySharesLedger};
pub use strategies::{InstantStrategy, LockedStrategy};
