// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating the dispatcher configuration.
///
/// These are fatal: they gate process start and never reach per-message
/// handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML/JSON or does not match the schema.
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting is missing or empty.
    #[error("Configuration field '{field}' must not be empty")]
    MissingField { field: &'static str },

    /// A setting is present but out of its allowed range.
    #[error("Configuration field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Several problems were found at once.
    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ConfigError>),
}
