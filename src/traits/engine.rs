// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::Path;

use crate::errors::WorkflowError;

/// Runs a named workflow against an input directory, writing into an output
/// directory. Implementations are opaque and may run for a long time.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    async fn execute(&self, name: &str, input: &Path, output: &Path) -> Result<(), WorkflowError>;
}
