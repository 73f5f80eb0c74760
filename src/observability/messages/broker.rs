// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the broker session and acknowledgments.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The consumer is bound and ready to receive deliveries.
///
/// # Log Level
/// `info!`
pub struct ConsumerStarted<'a> {
    pub exchange: &'a str,
    pub topic: &'a str,
    pub queue: &'a str,
}

impl Display for ConsumerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Consuming queue '{}' bound to exchange '{}' with topic '{}'",
            self.queue, self.exchange, self.topic
        )
    }
}

impl StructuredLog for ConsumerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            exchange = self.exchange,
            topic = self.topic,
            queue = self.queue,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "consumer",
            span_name = name,
            exchange = self.exchange,
            topic = self.topic,
        )
    }
}

/// A delivery was acknowledged.
///
/// # Log Level
/// `info!`
pub struct AcknowledgmentSent {
    pub delivery_tag: u64,
}

impl Display for AcknowledgmentSent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Acknowledgement sent for delivery {}", self.delivery_tag)
    }
}

impl StructuredLog for AcknowledgmentSent {
    fn log(&self) {
        tracing::info!(delivery_tag = self.delivery_tag, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("ack", span_name = name, delivery_tag = self.delivery_tag)
    }
}

/// The broker rejected or failed to receive an acknowledgment.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct AcknowledgmentFailed<'a> {
    pub delivery_tag: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for AcknowledgmentFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Acknowledgement for delivery {} failed: {}",
            self.delivery_tag, self.error
        )
    }
}

impl StructuredLog for AcknowledgmentFailed<'_> {
    fn log(&self) {
        tracing::error!(
            delivery_tag = self.delivery_tag,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("ack_failed", span_name = name, delivery_tag = self.delivery_tag)
    }
}

/// Shutdown was requested; no further deliveries will be taken.
///
/// # Log Level
/// `warn!`
pub struct ShutdownRequested;

impl Display for ShutdownRequested {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Interrupt received, stopping after the current job")
    }
}

impl StructuredLog for ShutdownRequested {
    fn log(&self) {
        tracing::warn!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("shutdown", span_name = name)
    }
}

/// The broker ended the subscription.
///
/// # Log Level
/// `warn!`
pub struct SubscriptionEnded;

impl Display for SubscriptionEnded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Broker subscription ended, no more deliveries")
    }
}

impl StructuredLog for SubscriptionEnded {
    fn log(&self) {
        tracing::warn!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("subscription_ended", span_name = name)
    }
}

/// Closing the broker session failed during shutdown.
///
/// # Log Level
/// `warn!`
pub struct SessionCloseFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for SessionCloseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to close broker session cleanly: {}", self.error)
    }
}

impl StructuredLog for SessionCloseFailed<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("session_close_failed", span_name = name)
    }
}
