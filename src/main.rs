// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use workflow_dispatcher::backends::process::ProcessWorkflowEngine;
use workflow_dispatcher::backends::rabbitmq::RabbitMqSession;
use workflow_dispatcher::backends::s3::S3ObjectStore;
use workflow_dispatcher::config::consts::DEFAULT_CONFIG_PATH;
use workflow_dispatcher::config::load_and_validate_config;
use workflow_dispatcher::engine::workspace::ensure_dir;
use workflow_dispatcher::engine::{JobDispatcher, Shutdown, ShutdownMode};
use workflow_dispatcher::errors::StoreError;
use workflow_dispatcher::observability::init_tracing;
use workflow_dispatcher::traits::ObjectStore;

/// Exit code conventionally used for termination by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Consume workflow requests from the message bus, stage their payloads and
/// run the requested workflows.
#[derive(Debug, Parser)]
#[command(name = "workflow-dispatcher", version)]
struct Args {
    /// Path to the YAML or JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = load_and_validate_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    tracing::debug!(?config, "Configuration loaded");

    ensure_dir(&config.working_dir, "working")
        .await
        .context("Failed to prepare the working directory")?;

    let store = S3ObjectStore::new(&config.storage).context("Failed to configure object store")?;
    let bucket_found = store
        .bucket_exists(&config.storage.bucket)
        .await
        .context("Failed to reach object store")?;
    if !bucket_found {
        return Err(StoreError::BucketNotFound(config.storage.bucket.clone()).into());
    }

    let mut session = RabbitMqSession::connect(&config.messaging)
        .await
        .context("Failed to connect to message broker")?;

    let engine = ProcessWorkflowEngine::new(&config.runner);
    let dispatcher = JobDispatcher::from_config(&config, Arc::new(store), Arc::new(engine));

    let shutdown = Shutdown::new();
    tokio::spawn(watch_interrupt(shutdown.clone()));

    let summary = dispatcher
        .run(&mut session, shutdown)
        .await
        .context("Message broker session failed")?;

    tracing::info!(
        processed = summary.processed,
        rejected = summary.rejected,
        fetch_failed = summary.fetch_failed,
        executed = summary.executed,
        ack_failures = summary.ack_failures,
        "Dispatcher stopped"
    );
    Ok(())
}

/// Turn Ctrl-C into a stop request. An interrupt in the middle of a job ends
/// the process on the spot; the delivery stays unacknowledged.
async fn watch_interrupt(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Unable to listen for interrupts");
        return;
    }

    if shutdown.request() == ShutdownMode::Abrupt {
        tracing::warn!("Interrupted while a job was in flight, exiting without acknowledgment");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
}
