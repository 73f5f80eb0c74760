// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for delivery intake and per-job results.
//!
//! This module contains message types for logging events related to:
//! * Message arrival and its metadata
//! * Event rejection before any staging
//! * The terminal summary of each job

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

const NONE: &str = "<none>";

/// A message was delivered by the broker.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use workflow_dispatcher::observability::messages::dispatch::MessageReceived;
///
/// let msg = MessageReceived {
///     delivery_tag: 7,
///     correlation_id: Some("abc123"),
///     app_id: Some("16988a78-87b5-4168-a5c3-2cfc2bab8e54"),
///     routing_key: "md.workflow.request",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct MessageReceived<'a> {
    pub delivery_tag: u64,
    pub correlation_id: Option<&'a str>,
    pub app_id: Option<&'a str>,
    pub routing_key: &'a str,
}

impl Display for MessageReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message received from application={}. Correlation ID={}. Delivery tag={}. Topic={}",
            self.app_id.unwrap_or(NONE),
            self.correlation_id.unwrap_or(NONE),
            self.delivery_tag,
            self.routing_key
        )
    }
}

impl StructuredLog for MessageReceived<'_> {
    fn log(&self) {
        tracing::info!(
            delivery_tag = self.delivery_tag,
            correlation_id = self.correlation_id.unwrap_or(NONE),
            app_id = self.app_id.unwrap_or(NONE),
            routing_key = self.routing_key,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job",
            span_name = name,
            delivery_tag = self.delivery_tag,
            correlation_id = self.correlation_id.unwrap_or(NONE),
        )
    }
}

/// The event failed validation and will be acknowledged without processing.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct MessageRejected<'a> {
    pub delivery_tag: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for MessageRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejecting delivery {}: {}, skipping",
            self.delivery_tag, self.error
        )
    }
}

impl StructuredLog for MessageRejected<'_> {
    fn log(&self) {
        tracing::error!(
            delivery_tag = self.delivery_tag,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "message_rejected",
            span_name = name,
            delivery_tag = self.delivery_tag,
        )
    }
}

/// Summary emitted once a job has reached its terminal branch.
///
/// `outcome` is one of `rejected`, `fetch_failed` or `executed`.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobFinished<'a> {
    pub correlation_id: &'a str,
    pub delivery_tag: u64,
    pub outcome: &'a str,
    pub workflows_succeeded: usize,
    pub workflows_failed: usize,
    pub acknowledged: bool,
    pub duration: Duration,
}

impl Display for JobFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' finished as {}: {} workflow(s) succeeded, {} failed, acknowledged={}, duration={:?}",
            self.correlation_id,
            self.outcome,
            self.workflows_succeeded,
            self.workflows_failed,
            self.acknowledged,
            self.duration
        )
    }
}

impl StructuredLog for JobFinished<'_> {
    fn log(&self) {
        tracing::info!(
            correlation_id = self.correlation_id,
            delivery_tag = self.delivery_tag,
            outcome = self.outcome,
            workflows_succeeded = self.workflows_succeeded,
            workflows_failed = self.workflows_failed,
            acknowledged = self.acknowledged,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "job_finished",
            span_name = name,
            correlation_id = self.correlation_id,
            outcome = self.outcome,
        )
    }
}

/// The dispatcher is idle, waiting for the next delivery.
///
/// # Log Level
/// `info!`
pub struct WaitingForEvents;

impl Display for WaitingForEvents {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Waiting for events...")
    }
}

impl StructuredLog for WaitingForEvents {
    fn log(&self) {
        tracing::info!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("waiting", span_name = name)
    }
}
