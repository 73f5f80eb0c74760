// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Exactly-once acknowledgment.
//!
//! Every delivery gets a [`PendingAck`] when it enters the dispatcher. The
//! token is consumed by [`AcknowledgmentPolicy::acknowledge`], so a second
//! acknowledgment for the same delivery does not compile, and forgetting one
//! is flagged by `#[must_use]`.
//!
//! Deliveries are acknowledged whatever happened to the job: rejected,
//! fetch failure or executed with any mix of workflow outcomes. There is no
//! negative acknowledgment and no redelivery path.

use crate::observability::messages::broker::{AcknowledgmentFailed, AcknowledgmentSent};
use crate::observability::messages::StructuredLog;
use crate::traits::BrokerSession;

/// The obligation to acknowledge one delivery.
#[must_use = "every delivery must be acknowledged exactly once"]
#[derive(Debug, PartialEq, Eq)]
pub struct PendingAck {
    delivery_tag: u64,
}

impl PendingAck {
    pub fn new(delivery_tag: u64) -> Self {
        Self { delivery_tag }
    }

    pub fn delivery_tag(&self) -> u64 {
        self.delivery_tag
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AcknowledgmentPolicy;

impl AcknowledgmentPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Send the acknowledgment.
    ///
    /// Returns whether the broker accepted it. A failure is logged and not
    /// retried; the broker will redeliver once the channel goes away.
    pub async fn acknowledge(&self, session: &dyn BrokerSession, pending: PendingAck) -> bool {
        let PendingAck { delivery_tag } = pending;
        match session.acknowledge(delivery_tag).await {
            Ok(()) => {
                AcknowledgmentSent { delivery_tag }.log();
                true
            }
            Err(e) => {
                AcknowledgmentFailed {
                    delivery_tag,
                    error: &e,
                }
                .log();
                false
            }
        }
    }
}
