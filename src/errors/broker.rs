// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the message broker session.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connecting or declaring the consumer topology failed.
    #[error("Broker connection failed: {0}")]
    Connection(String),

    /// Receiving the next delivery failed.
    #[error("Failed to receive delivery: {0}")]
    Consume(String),

    /// Acknowledging a delivery failed.
    #[error("Failed to acknowledge delivery {delivery_tag}: {reason}")]
    Acknowledge { delivery_tag: u64, reason: String },

    /// Closing the session failed.
    #[error("Failed to close broker session: {0}")]
    Close(String),
}

impl From<lapin::Error> for BrokerError {
    fn from(err: lapin::Error) -> Self {
        BrokerError::Connection(err.to_string())
    }
}
