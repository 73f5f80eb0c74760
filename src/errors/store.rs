// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors surfaced by an object store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("Object '{key}' not found in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    /// The requested bucket does not exist or is not accessible.
    #[error("Bucket '{0}' does not exist")]
    BucketNotFound(String),

    /// The store client could not be configured.
    #[error("Object store configuration error: {0}")]
    Configuration(String),

    /// Any other transport or backend failure.
    #[error("Object store error: {0}")]
    Backend(String),
}
