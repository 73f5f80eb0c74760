// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `dispatch` - Delivery intake, rejection and job summaries
//! * `workspace` - Job directory creation
//! * `fetch` - Payload listing and object downloads
//! * `workflow` - Workflow launch and outcome
//! * `broker` - Consumer lifecycle and acknowledgments
//!
//! # Usage Pattern
//!
//! ```rust
//! use workflow_dispatcher::observability::messages::fetch::ObjectSkipped;
//! use workflow_dispatcher::observability::messages::StructuredLog;
//!
//! let msg = ObjectSkipped { key: "p1/manifest.json" };
//! tracing::info!("{}", msg);
//! msg.log();
//! ```

use tracing::Span;

pub mod broker;
pub mod dispatch;
pub mod fetch;
pub mod workflow;
pub mod workspace;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
