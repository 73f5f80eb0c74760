// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Interrupt handling for the dispatch loop.
//!
//! A stop request while the dispatcher is idle ends the loop cleanly before
//! the next delivery is taken. A request that arrives in the middle of a job
//! is reported as [`ShutdownMode::Abrupt`]; the caller decides what that
//! means (the binary exits immediately, leaving the delivery unacknowledged
//! for the broker to redeliver).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// No job in flight.
    Graceful,
    /// A job is in flight.
    Abrupt,
}

/// Shared stop flag. Cheap to clone; all clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    busy: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the dispatcher to stop.
    pub fn request(&self) -> ShutdownMode {
        self.token.cancel();
        if self.busy.load(Ordering::SeqCst) {
            ShutdownMode::Abrupt
        } else {
            ShutdownMode::Graceful
        }
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a stop has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await
    }

    pub(crate) fn job_started(&self) {
        self.busy.store(true, Ordering::SeqCst);
    }

    pub(crate) fn job_finished(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}
