// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while staging a job's payload into its workspace.
///
/// Any single failure aborts the whole fetch: partially staged input is never
/// handed to a workflow.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Listing objects under the payload prefix failed.
    #[error("Failed to list objects under '{prefix}': {source}")]
    List {
        prefix: String,
        #[source]
        source: StoreError,
    },

    /// Opening or reading an object failed.
    #[error("Failed to download '{key}': {source}")]
    Download {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Writing the object into the workspace failed.
    #[error("Failed to write '{key}' to {}: {source}", path.display())]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The object key would resolve outside the job's input directory.
    #[error("Object key '{0}' resolves outside the input directory")]
    UnsafeKey(String),

    /// The job workspace could not be prepared.
    #[error(transparent)]
    Workspace(#[from] super::WorkspaceError),
}
