// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Payload staging: object store → job input directory.
//!
//! Objects are listed once, then downloaded strictly one after another in
//! listing order. Each object's key doubles as its path below the input
//! directory, so `p1/series/ct.dcm` lands at `input/p1/series/ct.dcm`.
//!
//! The fetch is all-or-nothing from the caller's point of view: the first
//! failing object aborts it with a [`FetchError`]. Files already written stay
//! on disk.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWriteExt;

use crate::config::consts::{FETCH_CHUNK_SIZE, JSON_SUFFIX};
use crate::engine::workspace::ensure_dir;
use crate::errors::FetchError;
use crate::observability::messages::fetch::{
    ObjectDownloadStarted, ObjectDownloaded, ObjectSkipped, PayloadFetched,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ObjectReader, ObjectStore};

/// An object written into the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedObject {
    pub key: String,
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// What a successful fetch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Objects written, in listing order.
    pub staged: Vec<StagedObject>,
    /// Keys excluded by the JSON filter.
    pub skipped: Vec<String>,
}

impl FetchSummary {
    /// Total bytes written across all staged objects.
    pub fn bytes_written(&self) -> u64 {
        self.staged.iter().map(|o| o.bytes_written).sum()
    }

    /// Objects seen under the prefix, staged or skipped.
    pub fn object_count(&self) -> usize {
        self.staged.len() + self.skipped.len()
    }
}

/// Drains a payload prefix into a job's input directory.
pub struct PayloadFetcher {
    store: Arc<dyn ObjectStore>,
    chunk_size: usize,
}

impl PayloadFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            chunk_size: FETCH_CHUNK_SIZE,
        }
    }

    /// Download every object under `payload_id` into `input_dir`.
    ///
    /// When `ignore_json` is set, keys ending in `.json` are skipped. Each
    /// object's reader is released before the next object is opened, whether
    /// its transfer succeeded or not.
    pub async fn fetch(
        &self,
        bucket: &str,
        payload_id: &str,
        input_dir: &Path,
        ignore_json: bool,
    ) -> Result<FetchSummary, FetchError> {
        let objects = self
            .store
            .list(bucket, payload_id)
            .await
            .map_err(|source| FetchError::List {
                prefix: payload_id.to_string(),
                source,
            })?;

        let mut summary = FetchSummary::default();

        for object in objects {
            if ignore_json && object.key.ends_with(JSON_SUFFIX) {
                ObjectSkipped { key: &object.key }.log();
                summary.skipped.push(object.key);
                continue;
            }

            if object.key.ends_with('/') {
                // directory placeholder, nothing to download
                tracing::debug!(key = %object.key, "Skipping directory marker");
                continue;
            }

            let destination = staged_path(input_dir, &object.key)?;

            ObjectDownloadStarted {
                key: &object.key,
                size: object.size,
            }
            .log();
            let started = Instant::now();

            let mut reader = self
                .store
                .get(bucket, &object.key)
                .await
                .map_err(|source| FetchError::Download {
                    key: object.key.clone(),
                    source,
                })?;

            let transfer = self
                .transfer(reader.as_mut(), &object.key, &destination)
                .await;
            reader.release().await;
            let bytes_written = transfer?;

            ObjectDownloaded {
                key: &object.key,
                bytes_written,
                duration: started.elapsed(),
            }
            .log();

            summary.staged.push(StagedObject {
                key: object.key,
                path: destination,
                bytes_written,
            });
        }

        PayloadFetched {
            payload_id,
            downloaded: summary.staged.len(),
            skipped: summary.skipped.len(),
            bytes_written: summary.bytes_written(),
        }
        .log();

        Ok(summary)
    }

    async fn transfer(
        &self,
        reader: &mut dyn ObjectReader,
        key: &str,
        destination: &Path,
    ) -> Result<u64, FetchError> {
        if let Some(parent) = destination.parent() {
            ensure_dir(parent, "object").await?;
        }

        let write_error = |source| FetchError::Write {
            key: key.to_string(),
            path: destination.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(write_error)?;
        let mut written = 0u64;

        while let Some(chunk) =
            reader
                .next_chunk(self.chunk_size)
                .await
                .map_err(|source| FetchError::Download {
                    key: key.to_string(),
                    source,
                })?
        {
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(write_error)?;
        Ok(written)
    }
}

/// Resolve `key` below `input_dir`, refusing keys that would escape it.
fn staged_path(input_dir: &Path, key: &str) -> Result<PathBuf, FetchError> {
    let relative = Path::new(key);
    let safe = !key.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    if safe {
        Ok(input_dir.join(relative))
    } else {
        Err(FetchError::UnsafeKey(key.to_string()))
    }
}
