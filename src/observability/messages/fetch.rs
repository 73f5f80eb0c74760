// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for staging a payload from the object store.
//!
//! This module contains message types for logging events related to:
//! * Objects skipped by the JSON filter
//! * Per-object downloads
//! * Payload-level completion and failure

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An object was excluded from the staged input.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use workflow_dispatcher::observability::messages::fetch::ObjectSkipped;
///
/// let msg = ObjectSkipped { key: "p1/manifest.json" };
/// assert_eq!(msg.to_string(), "Skipping JSON file p1/manifest.json...");
/// ```
pub struct ObjectSkipped<'a> {
    pub key: &'a str,
}

impl Display for ObjectSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping JSON file {}...", self.key)
    }
}

impl StructuredLog for ObjectSkipped<'_> {
    fn log(&self) {
        tracing::info!(key = self.key, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("object_skipped", span_name = name, key = self.key)
    }
}

/// Download of a single object started.
///
/// # Log Level
/// `info!`
pub struct ObjectDownloadStarted<'a> {
    pub key: &'a str,
    pub size: u64,
}

impl Display for ObjectDownloadStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Downloading file {} ({} bytes)...", self.key, self.size)
    }
}

impl StructuredLog for ObjectDownloadStarted<'_> {
    fn log(&self) {
        tracing::info!(key = self.key, size = self.size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "object_download",
            span_name = name,
            key = self.key,
            size = self.size,
        )
    }
}

/// A single object was written to the workspace.
///
/// # Log Level
/// `debug!`
pub struct ObjectDownloaded<'a> {
    pub key: &'a str,
    pub bytes_written: u64,
    pub duration: Duration,
}

impl Display for ObjectDownloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Downloaded {}: {} bytes in {:?}",
            self.key, self.bytes_written, self.duration
        )
    }
}

impl StructuredLog for ObjectDownloaded<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            bytes_written = self.bytes_written,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("object_downloaded", span_name = name, key = self.key)
    }
}

/// Every object under the payload prefix was handled.
///
/// # Log Level
/// `info!`
pub struct PayloadFetched<'a> {
    pub payload_id: &'a str,
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes_written: u64,
}

impl Display for PayloadFetched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Finished download payload {}: {} file(s), {} skipped, {} bytes",
            self.payload_id, self.downloaded, self.skipped, self.bytes_written
        )
    }
}

impl StructuredLog for PayloadFetched<'_> {
    fn log(&self) {
        tracing::info!(
            payload_id = self.payload_id,
            downloaded = self.downloaded,
            skipped = self.skipped,
            bytes_written = self.bytes_written,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "payload_fetched",
            span_name = name,
            payload_id = self.payload_id,
        )
    }
}

/// Staging the payload failed; the job is abandoned at this stage.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PayloadFetchFailed<'a> {
    pub correlation_id: &'a str,
    pub payload_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PayloadFetchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to download payload {} for request. Correlation ID={}: {}",
            self.payload_id, self.correlation_id, self.error
        )
    }
}

impl StructuredLog for PayloadFetchFailed<'_> {
    fn log(&self) {
        tracing::error!(
            correlation_id = self.correlation_id,
            payload_id = self.payload_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "payload_fetch_failed",
            span_name = name,
            correlation_id = self.correlation_id,
            payload_id = self.payload_id,
        )
    }
}

/// The event announced a different number of files than the store listed.
///
/// Informational only; the job continues with what was listed.
///
/// # Log Level
/// `warn!`
pub struct FileCountMismatch<'a> {
    pub payload_id: &'a str,
    pub announced: u64,
    pub listed: usize,
}

impl Display for FileCountMismatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Payload {} announced {} file(s) but {} object(s) were listed",
            self.payload_id, self.announced, self.listed
        )
    }
}

impl StructuredLog for FileCountMismatch<'_> {
    fn log(&self) {
        tracing::warn!(
            payload_id = self.payload_id,
            announced = self.announced,
            listed = self.listed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "file_count_mismatch",
            span_name = name,
            payload_id = self.payload_id,
        )
    }
}
