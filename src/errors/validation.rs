// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Rejection reasons for inbound events.

use thiserror::Error;

/// An inbound event that cannot be processed.
///
/// Validation errors are never retried: the dispatcher logs the reason and
/// acknowledges the message without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body is not a JSON object.
    #[error("Message body is not a valid JSON object: {0}")]
    MalformedBody(String),

    /// `payload_id` is absent, not a string, or empty.
    #[error("Message body has no 'payload_id'")]
    MissingPayloadId,

    /// `workflows` is absent, not a list of strings, or empty.
    #[error("No applications defined in the message body")]
    MissingWorkflows,

    /// Neither the message metadata nor the body carries a correlation id.
    #[error("Message has no correlation id")]
    MissingCorrelationId,

    /// The correlation id cannot be used as a workspace directory name.
    #[error("Correlation id '{0}' is not a valid workspace directory name")]
    InvalidCorrelationId(String),
}
