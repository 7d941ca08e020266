//! Role and pause storage plus clocks.

use crate::domain::{Address, Role};
use crate::ports::outbound::{AccessControl, PauseState, TimeSource};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// In-memory role table.
#[derive(Debug, Default)]
pub struct InMemoryAccessControl {
    grants: RwLock<HashSet<(Role, Address)>>,
}

impl InMemoryAccessControl {
    /// Create an empty role table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant every role to `account`.
    pub fn with_superuser(account: Address) -> Self {
        let acl = Self::new();
        for role in [Role::Admin, Role::Manager, Role::Pauser] {
            acl.grant(role, account);
        }
        acl
    }

    /// Grant `role` to `account`.
    pub fn grant(&self, role: Role, account: Address) {
        self.grants.write().insert((role, account));
    }

    /// Revoke `role` from `account`.
    pub fn revoke(&self, role: Role, account: Address) {
        self.grants.write().remove(&(role, account));
    }
}

impl AccessControl for InMemoryAccessControl {
    fn has_role(&self, role: Role, account: Address) -> bool {
        self.grants.read().contains(&(role, account))
    }
}

/// In-memory pause flag.
#[derive(Debug, Default)]
pub struct InMemoryPauseState {
    paused: AtomicBool,
}

impl InMemoryPauseState {
    /// Create an unpaused flag.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PauseState for InMemoryPauseState {
    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
    }
}

/// Clock driven by the caller.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock at `start`.
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Jump to `time`.
    pub fn set(&self, time: u64) {
        self.now.store(time, Ordering::SeqCst);
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
