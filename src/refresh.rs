//! Refresh signalling between actions and the views that display server
//! state.
//!
//! Anything that changes balances or award unlocks bumps the coordinator;
//! each subscriber sees the newest generation and refetches once, however
//! many bumps happened in between.

use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshReason {
    Startup,
    Manual,
    SignIn,
    DrawSettled,
    TenDraw,
    Redemption,
}

#[derive(Debug)]
pub struct RefreshCoordinator {
    tx: watch::Sender<u64>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        RefreshCoordinator { tx }
    }

    pub fn bump(&self, reason: RefreshReason) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
        debug!(?reason, generation = self.generation(), "refresh requested");
    }

    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    /// A subscription starts out having seen the current generation; only
    /// later bumps wake it.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}
