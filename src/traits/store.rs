// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::StoreError;

/// An object listed under a payload prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Full object key, e.g. `p1/series/ct.dcm`.
    pub key: String,
    /// Object size in bytes as reported by the listing.
    pub size: u64,
}

/// Read handle for a single object.
///
/// The handle holds a remote connection; callers must call [`release`] on every
/// path once they are done with it, whether or not the transfer succeeded.
///
/// [`release`]: ObjectReader::release
#[async_trait]
pub trait ObjectReader: Send {
    /// Read up to `chunk_size` bytes. Every chunk except the last is exactly
    /// `chunk_size` bytes long; `Ok(None)` marks the end of the object.
    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Option<Bytes>, StoreError>;

    /// Close the stream and return its connection.
    async fn release(&mut self);
}

/// Read-only view of an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether `bucket` exists and is reachable.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    /// List every object whose key starts with `prefix`, recursively, in the
    /// order the store returns them.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, StoreError>;

    /// Open an object for streaming.
    async fn get(&self, bucket: &str, key: &str) -> Result<Box<dyn ObjectReader>, StoreError>;
}
