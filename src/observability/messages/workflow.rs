// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// A workflow is about to run.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use std::path::Path;
/// use workflow_dispatcher::observability::messages::workflow::WorkflowLaunched;
///
/// let msg = WorkflowLaunched {
///     workflow: "seg-app",
///     input: Path::new("/jobs/abc123/input"),
///     output: Path::new("/jobs/abc123/output/seg-app"),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct WorkflowLaunched<'a> {
    pub workflow: &'a str,
    pub input: &'a Path,
    pub output: &'a Path,
}

impl Display for WorkflowLaunched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Launching application {}: input={}, output={}",
            self.workflow,
            self.input.display(),
            self.output.display()
        )
    }
}

impl StructuredLog for WorkflowLaunched<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            input = %self.input.display(),
            output = %self.output.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow",
            span_name = name,
            workflow = self.workflow,
            output = %self.output.display(),
        )
    }
}

/// A workflow finished successfully.
///
/// # Log Level
/// `info!`
pub struct WorkflowCompleted<'a> {
    pub workflow: &'a str,
    pub output: &'a Path,
    pub duration: Duration,
}

impl Display for WorkflowCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Application {} completed successfully in {:?}: output={}",
            self.workflow,
            self.duration,
            self.output.display()
        )
    }
}

impl StructuredLog for WorkflowCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            output = %self.output.display(),
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "workflow_completed",
            span_name = name,
            workflow = self.workflow,
        )
    }
}

/// A workflow failed. Sibling workflows still run.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkflowFailed<'a> {
    pub workflow: &'a str,
    pub reason: &'a str,
}

impl Display for WorkflowFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} failed with {}", self.workflow, self.reason)
    }
}

impl StructuredLog for WorkflowFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "workflow_failed",
            span_name = name,
            workflow = self.workflow,
        )
    }
}
