// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory collaborators for tests.
//!
//! Each double records what was asked of it so tests can assert on the
//! sequence of calls, and each supports targeted fault injection.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::engine::Shutdown;
use crate::errors::{BrokerError, StoreError, WorkflowError};
use crate::traits::{
    BrokerSession, InboundDelivery, ObjectReader, ObjectRef, ObjectStore, WorkflowEngine,
};

/// Build a delivery with the given tag, correlation id and JSON body.
pub fn delivery(tag: u64, correlation_id: Option<&str>, body: serde_json::Value) -> InboundDelivery {
    InboundDelivery {
        delivery_tag: tag,
        correlation_id: correlation_id.map(str::to_string),
        app_id: Some("16988a78-87b5-4168-a5c3-2cfc2bab8e54".to_string()),
        routing_key: "md.workflow.request".to_string(),
        body: body.to_string().into_bytes(),
    }
}

#[derive(Default)]
struct BrokerLog {
    ack_attempts: Vec<u64>,
    acknowledged: Vec<u64>,
    closed: bool,
}

/// A broker that hands out a fixed queue of deliveries.
///
/// Once the queue is drained the subscription ends, unless the broker was
/// told to stay open, in which case `next_delivery` waits forever.
pub struct ScriptedBroker {
    queue: VecDeque<InboundDelivery>,
    failing_acks: HashSet<u64>,
    consume_error_when_drained: bool,
    stay_open: bool,
    shutdown_when_drained: Option<Shutdown>,
    log: Arc<Mutex<BrokerLog>>,
}

impl ScriptedBroker {
    pub fn new(deliveries: Vec<InboundDelivery>) -> Self {
        Self {
            queue: deliveries.into(),
            failing_acks: HashSet::new(),
            consume_error_when_drained: false,
            stay_open: false,
            shutdown_when_drained: None,
            log: Arc::default(),
        }
    }

    /// Reject the acknowledgment of `delivery_tag`.
    pub fn failing_ack(mut self, delivery_tag: u64) -> Self {
        self.failing_acks.insert(delivery_tag);
        self
    }

    /// Fail with a consume error instead of ending the subscription.
    pub fn consume_error_when_drained(mut self) -> Self {
        self.consume_error_when_drained = true;
        self
    }

    /// Request `shutdown` when the queue is drained, then wait forever.
    pub fn shutdown_when_drained(mut self, shutdown: Shutdown) -> Self {
        self.stay_open = true;
        self.shutdown_when_drained = Some(shutdown);
        self
    }

    pub fn acknowledged(&self) -> Vec<u64> {
        self.log.lock().unwrap().acknowledged.clone()
    }

    pub fn ack_attempts(&self) -> Vec<u64> {
        self.log.lock().unwrap().ack_attempts.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.log.lock().unwrap().closed
    }
}

#[async_trait]
impl BrokerSession for ScriptedBroker {
    async fn next_delivery(&mut self) -> Result<Option<InboundDelivery>, BrokerError> {
        if let Some(delivery) = self.queue.pop_front() {
            return Ok(Some(delivery));
        }
        if self.consume_error_when_drained {
            return Err(BrokerError::Consume("channel closed by peer".to_string()));
        }
        if let Some(shutdown) = &self.shutdown_when_drained {
            shutdown.request();
        }
        if self.stay_open {
            std::future::pending::<()>().await;
        }
        Ok(None)
    }

    async fn acknowledge(&self, delivery_tag: u64) -> Result<(), BrokerError> {
        let mut log = self.log.lock().unwrap();
        log.ack_attempts.push(delivery_tag);
        if self.failing_acks.contains(&delivery_tag) {
            return Err(BrokerError::Acknowledge {
                delivery_tag,
                reason: "channel closed".to_string(),
            });
        }
        log.acknowledged.push(delivery_tag);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BrokerError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

#[derive(Default)]
struct StoreLog {
    opened: Vec<String>,
    released: Vec<String>,
    chunks: BTreeMap<String, Vec<usize>>,
}

/// An object store holding a single bucket in memory.
///
/// Listing is sorted by key.
pub struct MemoryObjectStore {
    bucket: String,
    objects: BTreeMap<String, Bytes>,
    failing_reads: HashSet<String>,
    failing_opens: HashSet<String>,
    log: Arc<Mutex<StoreLog>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: BTreeMap::new(),
            failing_reads: HashSet::new(),
            failing_opens: HashSet::new(),
            log: Arc::default(),
        }
    }

    pub fn with_object(mut self, key: &str, data: Vec<u8>) -> Self {
        self.objects.insert(key.to_string(), Bytes::from(data));
        self
    }

    /// Opening `key` succeeds but the first read fails.
    pub fn failing_read(mut self, key: &str) -> Self {
        self.failing_reads.insert(key.to_string());
        self
    }

    /// Opening `key` fails as if it vanished after listing.
    pub fn failing_open(mut self, key: &str) -> Self {
        self.failing_opens.insert(key.to_string());
        self
    }

    pub fn opened_keys(&self) -> Vec<String> {
        self.log.lock().unwrap().opened.clone()
    }

    pub fn released_keys(&self) -> Vec<String> {
        self.log.lock().unwrap().released.clone()
    }

    /// Sizes of the chunks handed out for `key`, in order.
    pub fn chunk_sizes(&self, key: &str) -> Vec<usize> {
        self.log
            .lock()
            .unwrap()
            .chunks
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn check_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        if bucket == self.bucket {
            Ok(())
        } else {
            Err(StoreError::BucketNotFound(bucket.to_string()))
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        Ok(bucket == self.bucket)
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, StoreError> {
        self.check_bucket(bucket)?;
        Ok(self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| ObjectRef {
                key: key.clone(),
                size: data.len() as u64,
            })
            .collect())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Box<dyn ObjectReader>, StoreError> {
        self.check_bucket(bucket)?;
        let data = match self.objects.get(key) {
            Some(data) if !self.failing_opens.contains(key) => data.clone(),
            _ => {
                return Err(StoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
        };

        self.log.lock().unwrap().opened.push(key.to_string());
        Ok(Box::new(MemoryReader {
            key: key.to_string(),
            data,
            fail: self.failing_reads.contains(key),
            log: self.log.clone(),
        }))
    }
}

struct MemoryReader {
    key: String,
    data: Bytes,
    fail: bool,
    log: Arc<Mutex<StoreLog>>,
}

#[async_trait]
impl ObjectReader for MemoryReader {
    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Option<Bytes>, StoreError> {
        if self.fail {
            return Err(StoreError::Backend("connection reset by peer".to_string()));
        }
        if self.data.is_empty() {
            return Ok(None);
        }
        let chunk = self.data.split_to(chunk_size.min(self.data.len()));
        self.log
            .lock()
            .unwrap()
            .chunks
            .entry(self.key.clone())
            .or_default()
            .push(chunk.len());
        Ok(Some(chunk))
    }

    async fn release(&mut self) {
        self.log.lock().unwrap().released.push(self.key.clone());
    }
}

/// One call made to a [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCall {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Files present under `input` when the workflow started.
    pub input_files: Vec<PathBuf>,
}

/// A workflow engine that records calls and fails on request.
#[derive(Default)]
pub struct RecordingEngine {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn panicking(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowEngine for RecordingEngine {
    async fn execute(&self, name: &str, input: &Path, output: &Path) -> Result<(), WorkflowError> {
        self.calls.lock().unwrap().push(EngineCall {
            name: name.to_string(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_files: files_under(input),
        });

        if self.panicking.contains(name) {
            panic!("{} blew up", name);
        }
        if self.failing.contains(name) {
            return Err(WorkflowError::ExitStatus {
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Relative paths of every file below `root`, sorted.
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_path_buf());
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
