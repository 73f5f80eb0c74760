// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for job workspace preparation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// A directory did not exist yet and was created.
///
/// `purpose` says what the directory is for: `working`, `input`, `output`
/// or `object`.
///
/// # Log Level
/// `info!`
pub struct DirectoryCreated<'a> {
    pub purpose: &'a str,
    pub path: &'a Path,
}

impl Display for DirectoryCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Creating {} directory {}",
            self.purpose,
            self.path.display()
        )
    }
}

impl StructuredLog for DirectoryCreated<'_> {
    fn log(&self) {
        tracing::info!(
            purpose = self.purpose,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "directory_created",
            span_name = name,
            purpose = self.purpose,
            path = %self.path.display(),
        )
    }
}

/// The workspace for a job exists with every directory its workflows need.
///
/// # Log Level
/// `debug!`
pub struct WorkspaceReady<'a> {
    pub correlation_id: &'a str,
    pub root: &'a Path,
    pub workflow_count: usize,
}

impl Display for WorkspaceReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workspace for job '{}' ready at {} with {} output director{}",
            self.correlation_id,
            self.root.display(),
            self.workflow_count,
            if self.workflow_count == 1 { "y" } else { "ies" }
        )
    }
}

impl StructuredLog for WorkspaceReady<'_> {
    fn log(&self) {
        tracing::debug!(
            correlation_id = self.correlation_id,
            root = %self.root.display(),
            workflow_count = self.workflow_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "workspace_ready",
            span_name = name,
            correlation_id = self.correlation_id,
        )
    }
}
