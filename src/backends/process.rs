// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow engine that shells out to an application runner.
//!
//! Each workflow becomes one child process:
//!
//! ```text
//! <command> run [-q] <workflow> <input_dir> <output_dir>
//! ```
//!
//! The child inherits stdout/stderr so the runner's own progress output ends
//! up next to the dispatcher's logs.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::RunnerConfig;
use crate::errors::WorkflowError;
use crate::traits::WorkflowEngine;

#[derive(Debug, Clone)]
pub struct ProcessWorkflowEngine {
    command: String,
    quiet: bool,
}

impl ProcessWorkflowEngine {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            command: config.command.clone(),
            quiet: config.quiet,
        }
    }

    fn command_for(&self, name: &str, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.arg("run");
        if self.quiet {
            cmd.arg("-q");
        }
        cmd.arg(name).arg(input).arg(output).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl WorkflowEngine for ProcessWorkflowEngine {
    async fn execute(&self, name: &str, input: &Path, output: &Path) -> Result<(), WorkflowError> {
        let status = self
            .command_for(name, input, output)
            .status()
            .await
            .map_err(|source| WorkflowError::Launch {
                command: self.command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(WorkflowError::ExitStatus {
                status: status.to_string(),
            })
        }
    }
}
