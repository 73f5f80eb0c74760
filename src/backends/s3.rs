// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! S3-compatible object store (MinIO, AWS S3) built on `object_store`.
//!
//! One client is built per bucket on first use and kept for the life of the
//! process. Object bodies arrive as network-sized chunks; [`S3ObjectReader`]
//! re-slices them into the fixed-size chunks the fetcher asks for.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as StorePath;
use object_store::{ObjectMeta, ObjectStore as _};

use crate::config::StorageConfig;
use crate::errors::StoreError;
use crate::traits::{ObjectReader, ObjectRef, ObjectStore};

pub struct S3ObjectStore {
    endpoint: String,
    username: String,
    password: String,
    region: String,
    allow_http: bool,
    clients: Mutex<HashMap<String, Arc<AmazonS3>>>,
}

impl S3ObjectStore {
    /// Build a store for the configured endpoint. No request is made until
    /// the first call.
    pub fn new(config: &StorageConfig) -> Result<Self, StoreError> {
        let store = Self {
            endpoint: config.endpoint_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            region: config.region.clone(),
            allow_http: !config.secure,
            clients: Mutex::new(HashMap::new()),
        };
        // surface configuration problems at startup
        store.client(&config.bucket)?;
        Ok(store)
    }

    fn client(&self, bucket: &str) -> Result<Arc<AmazonS3>, StoreError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| StoreError::Configuration("client cache poisoned".to_string()))?;

        if let Some(client) = clients.get(bucket) {
            return Ok(client.clone());
        }

        let client = AmazonS3Builder::new()
            .with_endpoint(&self.endpoint)
            .with_access_key_id(&self.username)
            .with_secret_access_key(&self.password)
            .with_region(&self.region)
            .with_bucket_name(bucket)
            .with_allow_http(self.allow_http)
            .build()
            .map(Arc::new)
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        clients.insert(bucket.to_string(), client.clone());
        Ok(client)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        let client = self.client(bucket)?;
        let first = client.list(None).next().await;
        bucket_found(first.transpose())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectRef>, StoreError> {
        let client = self.client(bucket)?;
        list_with_prefix(client.as_ref(), prefix)
            .await
            .map_err(|e| store_error(bucket, prefix, e))
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Box<dyn ObjectReader>, StoreError> {
        let client = self.client(bucket)?;
        let location = StorePath::parse(key).map_err(|e| StoreError::Backend(e.to_string()))?;

        let result = client
            .get(&location)
            .await
            .map_err(|e| store_error(bucket, key, e))?;

        Ok(Box::new(S3ObjectReader::new(result.into_stream())))
    }
}

/// Every object whose key starts with `prefix`, as a plain string.
///
/// `object_store` filters listings by whole path segments, so the listing
/// starts at the last complete segment of `prefix` and the rest is matched
/// here. `p1` therefore also matches `p10/...` and `p1-extra`.
async fn list_with_prefix(
    store: &dyn object_store::ObjectStore,
    prefix: &str,
) -> object_store::Result<Vec<ObjectRef>> {
    let parent = prefix
        .rfind('/')
        .map(|i| &prefix[..i])
        .filter(|p| !p.is_empty())
        .map(StorePath::from);

    let mut objects = Vec::new();
    let mut listing = store.list(parent.as_ref());
    while let Some(meta) = listing.next().await {
        let meta = meta?;
        let key = meta.location.to_string();
        if key.starts_with(prefix) {
            objects.push(ObjectRef {
                key,
                size: meta.size as u64,
            });
        }
    }
    Ok(objects)
}

/// Interpret the first entry of a bucket listing.
fn bucket_found(first: object_store::Result<Option<ObjectMeta>>) -> Result<bool, StoreError> {
    match first {
        Ok(_) => Ok(true),
        Err(object_store::Error::NotFound { .. }) => Ok(false),
        Err(e) => Err(StoreError::Backend(e.to_string())),
    }
}

fn store_error(bucket: &str, key: &str, err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        other => StoreError::Backend(other.to_string()),
    }
}

/// Streaming body of one object.
pub struct S3ObjectReader {
    stream: Option<BoxStream<'static, object_store::Result<Bytes>>>,
    buffer: BytesMut,
}

impl S3ObjectReader {
    fn new(stream: BoxStream<'static, object_store::Result<Bytes>>) -> Self {
        Self {
            stream: Some(stream),
            buffer: BytesMut::new(),
        }
    }
}

#[async_trait]
impl ObjectReader for S3ObjectReader {
    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Option<Bytes>, StoreError> {
        while self.buffer.len() < chunk_size {
            let Some(stream) = self.stream.as_mut() else {
                break;
            };
            match stream.next().await {
                Some(Ok(bytes)) => self.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => return Err(StoreError::Backend(e.to_string())),
                None => {
                    self.stream = None;
                    break;
                }
            }
        }

        if self.buffer.is_empty() {
            return Ok(None);
        }
        let take = chunk_size.min(self.buffer.len());
        Ok(Some(self.buffer.split_to(take).freeze()))
    }

    async fn release(&mut self) {
        // dropping the body stream returns the connection
        self.stream = None;
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use object_store::memory::InMemory;

    fn reader(parts: Vec<&'static [u8]>) -> S3ObjectReader {
        S3ObjectReader::new(
            stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p)))).boxed(),
        )
    }

    async fn drain(reader: &mut S3ObjectReader, chunk_size: usize) -> Vec<Vec<u8>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = reader.next_chunk(chunk_size).await.unwrap() {
            chunks.push(chunk.to_vec());
        }
        chunks
    }

    #[tokio::test]
    async fn test_reader_rechunks_network_parts() {
        let mut reader = reader(vec![b"ab", b"cdefg", b"h", b"ijk"]);

        let chunks = drain(&mut reader, 4).await;

        assert_eq!(chunks, vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ijk".to_vec()]);
    }

    #[tokio::test]
    async fn test_reader_handles_empty_object() {
        let mut reader = reader(vec![]);
        assert!(reader.next_chunk(4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reader_surfaces_stream_errors() {
        let parts: Vec<object_store::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(object_store::Error::Generic {
                store: "S3",
                source: "connection reset".into(),
            }),
        ];
        let mut reader = S3ObjectReader::new(stream::iter(parts).boxed());

        assert!(matches!(
            reader.next_chunk(8).await,
            Err(StoreError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_release_stops_reading() {
        let mut reader = reader(vec![b"abcdef"]);
        assert_eq!(reader.next_chunk(2).await.unwrap().unwrap().as_ref(), b"ab");

        reader.release().await;

        assert!(reader.next_chunk(2).await.unwrap().is_none());
    }

    async fn listed_keys(store: &InMemory, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = list_with_prefix(store, prefix)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.key)
            .collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn test_listing_matches_string_prefix_across_segments() {
        let store = InMemory::new();
        for key in ["p1/ct.dcm", "p10/other.dcm", "p1-extra.dcm", "p1/sub/x.dcm"] {
            store
                .put(&StorePath::from(key), Bytes::from_static(b"x").into())
                .await
                .unwrap();
        }

        assert_eq!(
            listed_keys(&store, "p1").await,
            vec!["p1-extra.dcm", "p1/ct.dcm", "p1/sub/x.dcm", "p10/other.dcm"]
        );
        assert_eq!(listed_keys(&store, "p1/").await, vec!["p1/ct.dcm", "p1/sub/x.dcm"]);
        assert_eq!(listed_keys(&store, "p1/ct.dcm").await, vec!["p1/ct.dcm"]);
        assert_eq!(listed_keys(&store, "p1/sub").await, vec!["p1/sub/x.dcm"]);
        assert!(listed_keys(&store, "p10/x").await.is_empty());
    }

    #[tokio::test]
    async fn test_listing_reports_object_sizes() {
        let store = InMemory::new();
        store
            .put(&StorePath::from("p1/ct.dcm"), Bytes::from_static(b"dicom").into())
            .await
            .unwrap();

        let objects = list_with_prefix(&store, "p1").await.unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].size, 5);
    }

    #[test]
    fn test_bucket_gate_matches_error_variant() {
        assert!(bucket_found(Ok(None)).unwrap());
        assert!(!bucket_found(Err(object_store::Error::NotFound {
            path: String::new(),
            source: "missing".into(),
        }))
        .unwrap());

        let other = bucket_found(Err(object_store::Error::Generic {
            store: "S3",
            source: "NoSuchBucket: the specified bucket does not exist".into(),
        }));
        assert!(matches!(other, Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_not_found_keeps_bucket_and_key() {
        let err = store_error(
            "monaideploy",
            "p1/ct.dcm",
            object_store::Error::NotFound {
                path: "p1/ct.dcm".to_string(),
                source: "missing".into(),
            },
        );

        assert!(matches!(
            err,
            StoreError::NotFound { ref bucket, ref key } if bucket == "monaideploy" && key == "p1/ct.dcm"
        ));
    }

    #[test]
    fn test_new_builds_client_without_network() {
        let config: StorageConfig = serde_yaml::from_str(
            r#"
endpoint: localhost:9000
username: minioadmin
password: minioadmin
bucket: monaideploy
"#,
        )
        .unwrap();

        assert!(S3ObjectStore::new(&config).is_ok());
    }
}
