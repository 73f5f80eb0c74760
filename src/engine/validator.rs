// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inbound event parsing and sanity checks.
//!
//! The body of a workflow request looks like:
//!
//! ```json
//! { "payload_id": "p1", "workflows": ["seg-app", "class-app"] }
//! ```
//!
//! `correlation_id`, `file_count` and `timestamp` may also appear in the body.
//! The job id is taken from the message properties first and only falls back
//! to the body when the publisher did not set one.

use serde::Deserialize;

use crate::engine::workspace::is_directory_name;
use crate::errors::ValidationError;
use crate::traits::InboundDelivery;

/// A validated unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Job id; also the name of the job's workspace directory.
    pub correlation_id: String,
    /// Object-store prefix holding the input artifacts.
    pub payload_id: String,
    /// Workflows to run, in order. Never empty.
    pub workflows: Vec<String>,
    /// Number of files the publisher says the payload holds, if it said.
    pub file_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventBody {
    payload_id: Option<String>,
    workflows: Option<Vec<String>>,
    correlation_id: Option<String>,
    file_count: Option<u64>,
}

/// Turns raw deliveries into [`InboundEvent`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageValidator;

impl MessageValidator {
    pub fn new() -> Self {
        Self
    }

    /// Parse and check a delivery.
    ///
    /// Rejects the event when the body is not a JSON object, `payload_id` is
    /// missing or empty, `workflows` is missing or empty, no correlation id is
    /// available, or the correlation id cannot name a directory. Workflow names
    /// are kept as given; one that cannot name a directory fails on its own.
    pub fn validate(&self, delivery: &InboundDelivery) -> Result<InboundEvent, ValidationError> {
        let body: EventBody = serde_json::from_slice(&delivery.body)
            .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;

        let workflows = body
            .workflows
            .filter(|w| !w.is_empty())
            .ok_or(ValidationError::MissingWorkflows)?;

        let payload_id = body
            .payload_id
            .filter(|p| !p.trim().is_empty())
            .ok_or(ValidationError::MissingPayloadId)?;

        let correlation_id = delivery
            .correlation_id
            .clone()
            .filter(|c| !c.is_empty())
            .or(body.correlation_id.filter(|c| !c.is_empty()))
            .ok_or(ValidationError::MissingCorrelationId)?;

        if !is_directory_name(&correlation_id) {
            return Err(ValidationError::InvalidCorrelationId(correlation_id));
        }

        Ok(InboundEvent {
            correlation_id,
            payload_id,
            workflows,
            file_count: body.file_count,
        })
    }
}
