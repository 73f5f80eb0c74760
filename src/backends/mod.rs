// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Production implementations of the dispatcher's collaborators.
//!
//! Each backend implements one of the traits in [`crate::traits`] and is
//! injected into the [`JobDispatcher`](crate::engine::JobDispatcher) at
//! startup.
//!
//! # Available Backends
//!
//! ## RabbitMQ (`rabbitmq`)
//! [`BrokerSession`](crate::traits::BrokerSession) over AMQP 0.9.1:
//! - **Topology**: durable topic exchange, exclusive server-named queue
//! - **Delivery**: manual acknowledgment, prefetch 1 by default
//!
//! ## S3 (`s3`)
//! [`ObjectStore`](crate::traits::ObjectStore) for MinIO or AWS S3:
//! - **Listing**: recursive, by key prefix
//! - **Reading**: streamed, re-chunked to a fixed size
//!
//! ## Process (`process`)
//! [`WorkflowEngine`](crate::traits::WorkflowEngine) that runs each workflow
//! as a child process of the configured runner command.
//!
//! ## Stub Backend (Test-Only)
//! In-memory doubles with call recording and fault injection:
//! - **ScriptedBroker**: fixed queue of deliveries, records acknowledgments
//! - **MemoryObjectStore**: single bucket, failing keys, reader release tracking
//! - **RecordingEngine**: records invocations, fails or panics on request
//! - **Note**: NOT available in production builds
//!
//! # Example
//!
//! ```rust,no_run
//! use workflow_dispatcher::backends::s3::S3ObjectStore;
//! use workflow_dispatcher::config::load_config;
//! use workflow_dispatcher::traits::ObjectStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("config.json")?;
//! let store = S3ObjectStore::new(&config.storage)?;
//! assert!(store.bucket_exists(&config.storage.bucket).await?);
//! # Ok(())
//! # }
//! ```

pub mod process;
pub mod rabbitmq;
pub mod s3;
#[cfg(test)]
pub mod stub;
