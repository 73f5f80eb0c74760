// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The per-delivery state machine and the consume loop around it.
//!
//! ```text
//! Received ──► Rejected ─────────────────────────────┐
//!    │                                                │
//!    ▼                                                ▼
//! Validated ──► WorkspaceReady ──► FetchFailed ──► Acknowledged
//!                     │                               ▲
//!                     ▼                               │
//!                  Fetched ──► Executed ──────────────┘
//! ```
//!
//! Each delivery is carried from `Received` to a terminal outcome and then
//! acknowledged exactly once, regardless of which branch it took. Deliveries
//! are processed strictly one at a time; the next one is not taken from the
//! broker until the previous one has been acknowledged.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use workflow_dispatcher::backends::process::ProcessWorkflowEngine;
//! use workflow_dispatcher::backends::rabbitmq::RabbitMqSession;
//! use workflow_dispatcher::backends::s3::S3ObjectStore;
//! use workflow_dispatcher::config::load_and_validate_config;
//! use workflow_dispatcher::engine::{JobDispatcher, Shutdown};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_and_validate_config("config.json")?;
//! let store = Arc::new(S3ObjectStore::new(&config.storage)?);
//! let engine = Arc::new(ProcessWorkflowEngine::new(&config.runner));
//! let mut session = RabbitMqSession::connect(&config.messaging).await?;
//!
//! let dispatcher = JobDispatcher::from_config(&config, store, engine);
//! let summary = dispatcher.run(&mut session, Shutdown::new()).await?;
//! println!("processed {} job(s)", summary.processed);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;

use crate::config::Config;
use crate::engine::acknowledgment::{AcknowledgmentPolicy, PendingAck};
use crate::engine::executor::{WorkflowExecutor, WorkflowInvocation};
use crate::engine::fetcher::{FetchSummary, PayloadFetcher};
use crate::engine::shutdown::Shutdown;
use crate::engine::validator::{InboundEvent, MessageValidator};
use crate::engine::workspace::JobWorkspace;
use crate::errors::{BrokerError, FetchError, ValidationError};
use crate::observability::messages::broker::{
    SessionCloseFailed, ShutdownRequested, SubscriptionEnded,
};
use crate::observability::messages::dispatch::{
    JobFinished, MessageReceived, MessageRejected, WaitingForEvents,
};
use crate::observability::messages::fetch::{FileCountMismatch, PayloadFetchFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{BrokerSession, InboundDelivery, ObjectStore, WorkflowEngine};

/// The slice of [`Config`] the dispatcher needs per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSettings {
    pub working_dir: PathBuf,
    pub bucket: String,
    pub ignore_json: bool,
}

impl DispatcherSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            working_dir: config.working_dir.clone(),
            bucket: config.storage.bucket.clone(),
            ignore_json: config.ignore_json,
        }
    }
}

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    /// The event failed validation; nothing was staged or run.
    Rejected(ValidationError),
    /// Workspace preparation or payload staging failed; no workflow ran.
    FetchFailed(FetchError),
    /// Every workflow was attempted, one invocation each.
    Executed(Vec<WorkflowInvocation>),
}

impl JobOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Rejected(_) => "rejected",
            JobOutcome::FetchFailed(_) => "fetch_failed",
            JobOutcome::Executed(_) => "executed",
        }
    }

    /// Invocations of an executed job; empty for the other outcomes.
    pub fn invocations(&self) -> &[WorkflowInvocation] {
        match self {
            JobOutcome::Executed(invocations) => invocations,
            _ => &[],
        }
    }
}

/// What happened to one delivery.
#[derive(Debug)]
pub struct JobReport {
    pub delivery_tag: u64,
    /// Known once the event validated, or when the broker supplied one.
    pub correlation_id: Option<String>,
    pub outcome: JobOutcome,
    pub acknowledged: bool,
    pub duration: Duration,
}

impl JobReport {
    pub fn workflows_succeeded(&self) -> usize {
        self.outcome
            .invocations()
            .iter()
            .filter(|i| i.outcome.is_success())
            .count()
    }

    pub fn workflows_failed(&self) -> usize {
        self.outcome.invocations().len() - self.workflows_succeeded()
    }
}

/// Totals across a run of the consume loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub rejected: usize,
    pub fetch_failed: usize,
    pub executed: usize,
    pub ack_failures: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: &JobReport) {
        self.processed += 1;
        match report.outcome {
            JobOutcome::Rejected(_) => self.rejected += 1,
            JobOutcome::FetchFailed(_) => self.fetch_failed += 1,
            JobOutcome::Executed(_) => self.executed += 1,
        }
        if !report.acknowledged {
            self.ack_failures += 1;
        }
    }
}

enum JobState {
    Received,
    Validated(InboundEvent),
    WorkspaceReady(InboundEvent, JobWorkspace),
    Fetched(InboundEvent, JobWorkspace),
    Terminal(JobOutcome),
}

pub struct JobDispatcher {
    settings: DispatcherSettings,
    validator: MessageValidator,
    fetcher: PayloadFetcher,
    executor: WorkflowExecutor,
    ack_policy: AcknowledgmentPolicy,
}

impl JobDispatcher {
    pub fn new(
        settings: DispatcherSettings,
        store: Arc<dyn ObjectStore>,
        engine: Arc<dyn WorkflowEngine>,
    ) -> Self {
        Self {
            settings,
            validator: MessageValidator::new(),
            fetcher: PayloadFetcher::new(store),
            executor: WorkflowExecutor::new(engine),
            ack_policy: AcknowledgmentPolicy::new(),
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        engine: Arc<dyn WorkflowEngine>,
    ) -> Self {
        Self::new(DispatcherSettings::from_config(config), store, engine)
    }

    /// Consume deliveries until the subscription ends or a stop is requested.
    ///
    /// The stop request is only observed while waiting for the next
    /// delivery. The session is closed on every exit path; a broker error
    /// while consuming is returned after the close.
    pub async fn run(
        &self,
        session: &mut dyn BrokerSession,
        shutdown: Shutdown,
    ) -> Result<RunSummary, BrokerError> {
        let mut summary = RunSummary::default();

        let result = loop {
            if shutdown.is_requested() {
                ShutdownRequested.log();
                break Ok(());
            }

            WaitingForEvents.log();
            let next = tokio::select! {
                biased;
                _ = shutdown.requested() => None,
                delivery = session.next_delivery() => Some(delivery),
            };

            let delivery = match next {
                None => {
                    ShutdownRequested.log();
                    break Ok(());
                }
                Some(Ok(Some(delivery))) => delivery,
                Some(Ok(None)) => {
                    SubscriptionEnded.log();
                    break Ok(());
                }
                Some(Err(e)) => break Err(e),
            };

            shutdown.job_started();
            let report = self.handle(delivery, &*session).await;
            shutdown.job_finished();

            summary.record(&report);
        };

        if let Err(e) = session.close().await {
            SessionCloseFailed { error: &e }.log();
        }

        result.map(|()| summary)
    }

    /// Carry one delivery to a terminal outcome and acknowledge it.
    pub async fn handle(&self, delivery: InboundDelivery, session: &dyn BrokerSession) -> JobReport {
        let pending = PendingAck::new(delivery.delivery_tag);

        let received = MessageReceived {
            delivery_tag: delivery.delivery_tag,
            correlation_id: delivery.correlation_id.as_deref(),
            app_id: delivery.app_id.as_deref(),
            routing_key: &delivery.routing_key,
        };
        received.log();
        let span = received.span("handle");

        async move {
            let started = Instant::now();
            let mut correlation_id = delivery.correlation_id.clone();
            let mut state = JobState::Received;

            let outcome = loop {
                state = match state {
                    JobState::Terminal(outcome) => break outcome,
                    other => self.advance(other, &delivery).await,
                };
                if let JobState::Validated(event) = &state {
                    correlation_id = Some(event.correlation_id.clone());
                }
            };

            let acknowledged = self.ack_policy.acknowledge(session, pending).await;

            let report = JobReport {
                delivery_tag: delivery.delivery_tag,
                correlation_id,
                outcome,
                acknowledged,
                duration: started.elapsed(),
            };

            JobFinished {
                correlation_id: report.correlation_id.as_deref().unwrap_or("<none>"),
                delivery_tag: report.delivery_tag,
                outcome: report.outcome.label(),
                workflows_succeeded: report.workflows_succeeded(),
                workflows_failed: report.workflows_failed(),
                acknowledged: report.acknowledged,
                duration: report.duration,
            }
            .log();

            report
        }
        .instrument(span)
        .await
    }

    async fn advance(&self, state: JobState, delivery: &InboundDelivery) -> JobState {
        match state {
            JobState::Received => match self.validator.validate(delivery) {
                Ok(event) => JobState::Validated(event),
                Err(e) => {
                    MessageRejected {
                        delivery_tag: delivery.delivery_tag,
                        error: &e,
                    }
                    .log();
                    JobState::Terminal(JobOutcome::Rejected(e))
                }
            },

            JobState::Validated(event) => match JobWorkspace::ensure(
                &self.settings.working_dir,
                &event.correlation_id,
                &event.workflows,
            )
            .await
            {
                Ok(workspace) => JobState::WorkspaceReady(event, workspace),
                Err(e) => fetch_failed(&event, FetchError::from(e)),
            },

            JobState::WorkspaceReady(event, workspace) => match self
                .fetcher
                .fetch(
                    &self.settings.bucket,
                    &event.payload_id,
                    workspace.input_dir(),
                    self.settings.ignore_json,
                )
                .await
            {
                Ok(summary) => {
                    check_file_count(&event, &summary);
                    JobState::Fetched(event, workspace)
                }
                Err(e) => fetch_failed(&event, e),
            },

            JobState::Fetched(event, workspace) => {
                let invocations = self.executor.run_all(&event.workflows, &workspace).await;
                JobState::Terminal(JobOutcome::Executed(invocations))
            }

            terminal @ JobState::Terminal(_) => terminal,
        }
    }
}

fn fetch_failed(event: &InboundEvent, error: FetchError) -> JobState {
    PayloadFetchFailed {
        correlation_id: &event.correlation_id,
        payload_id: &event.payload_id,
        error: &error,
    }
    .log();
    JobState::Terminal(JobOutcome::FetchFailed(error))
}

fn check_file_count(event: &InboundEvent, summary: &FetchSummary) {
    if let Some(announced) = event.file_count {
        if announced != summary.object_count() as u64 {
            FileCountMismatch {
                payload_id: &event.payload_id,
                announced,
                listed: summary.object_count(),
            }
            .log();
        }
    }
}
