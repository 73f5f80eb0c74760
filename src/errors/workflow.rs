// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A single workflow invocation failed.
///
/// Contained at the executor boundary; never affects sibling workflows or the
/// message acknowledgment.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The workflow runner could not be started.
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The workflow name sanitizes to something that cannot be a directory.
    #[error("Workflow name '{0}' cannot form an output directory")]
    UnusableName(String),

    /// The workflow runner exited unsuccessfully.
    #[error("Workflow exited with {status}")]
    ExitStatus { status: String },

    /// The engine panicked while running the workflow.
    #[error("Workflow panicked: {0}")]
    Panicked(String),
}
