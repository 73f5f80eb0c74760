// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential workflow execution with per-workflow failure containment.
//!
//! Every workflow named by the event gets exactly one invocation, in event
//! order, whether or not earlier ones failed. Errors and panics from the
//! engine are converted into a [`WorkflowOutcome::Failed`] and logged; they
//! never leave this module. A name that cannot form an output directory fails
//! without reaching the engine.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::Instrument;

use crate::engine::workspace::{has_output_dir, JobWorkspace};
use crate::errors::WorkflowError;
use crate::observability::messages::workflow::{
    WorkflowCompleted, WorkflowFailed, WorkflowLaunched,
};
use crate::observability::messages::StructuredLog;
use crate::traits::WorkflowEngine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Success,
    Failed(String),
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Success)
    }
}

/// Record of one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowInvocation {
    /// Workflow name exactly as it appeared in the event.
    pub name: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub outcome: WorkflowOutcome,
    pub duration: Duration,
}

pub struct WorkflowExecutor {
    engine: Arc<dyn WorkflowEngine>,
}

impl WorkflowExecutor {
    pub fn new(engine: Arc<dyn WorkflowEngine>) -> Self {
        Self { engine }
    }

    /// Run each workflow once against the job's shared input directory.
    ///
    /// Returns one invocation per entry of `workflows`, in the same order.
    pub async fn run_all(
        &self,
        workflows: &[String],
        workspace: &JobWorkspace,
    ) -> Vec<WorkflowInvocation> {
        let mut invocations = Vec::with_capacity(workflows.len());
        for name in workflows {
            invocations.push(self.run_one(name, workspace).await);
        }
        invocations
    }

    async fn run_one(&self, name: &str, workspace: &JobWorkspace) -> WorkflowInvocation {
        let input_dir = workspace.input_dir().to_path_buf();
        let output_dir = workspace.output_dir_for(name);

        let (result, duration) = if has_output_dir(name) {
            self.launch(name, &input_dir, &output_dir).await
        } else {
            (Err(WorkflowError::UnusableName(name.to_string())), Duration::ZERO)
        };

        let outcome = match result {
            Ok(()) => {
                WorkflowCompleted {
                    workflow: name,
                    output: &output_dir,
                    duration,
                }
                .log();
                WorkflowOutcome::Success
            }
            Err(e) => {
                let reason = e.to_string();
                WorkflowFailed {
                    workflow: name,
                    reason: &reason,
                }
                .log();
                WorkflowOutcome::Failed(reason)
            }
        };

        WorkflowInvocation {
            name: name.to_string(),
            input_dir,
            output_dir,
            outcome,
            duration,
        }
    }

    async fn launch(
        &self,
        name: &str,
        input_dir: &Path,
        output_dir: &Path,
    ) -> (Result<(), WorkflowError>, Duration) {
        let launched = WorkflowLaunched {
            workflow: name,
            input: input_dir,
            output: output_dir,
        };
        launched.log();
        let span = launched.span("run_workflow");

        let started = Instant::now();
        let result = AssertUnwindSafe(self.engine.execute(name, input_dir, output_dir))
            .catch_unwind()
            .instrument(span)
            .await
            .unwrap_or_else(|panic| Err(WorkflowError::Panicked(panic_message(panic))));
        (result, started.elapsed())
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
