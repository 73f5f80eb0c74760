// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational log lines in the dispatcher come from typed
//! message structs. Each struct implements `Display` for the human-readable
//! line and [`messages::StructuredLog`] to emit the event at its level with
//! the same data attached as structured fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::dispatch` - Delivery intake, rejection and per-job summaries
//! * `messages::workspace` - Job directory creation
//! * `messages::fetch` - Payload listing and object downloads
//! * `messages::workflow` - Workflow launch and outcome
//! * `messages::broker` - Consumer lifecycle and acknowledgments
//!
//! # Usage
//!
//! ```rust
//! use workflow_dispatcher::observability::messages::workflow::WorkflowFailed;
//! use workflow_dispatcher::observability::messages::StructuredLog;
//!
//! WorkflowFailed {
//!     workflow: "seg-app",
//!     reason: "Workflow exited with exit status: 1",
//! }
//! .log();
//! ```
//!
//! `init_tracing` installs the process-wide subscriber; it is called once
//! from `main`.

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `info`)
/// applies to every target.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
