//! In-memory `RemoteStore` that records every call.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use drive_files::error::{DriveError, Result};
use drive_files::store::{ByteStream, Media, RemoteStore};
use drive_files::{FileSpec, RemoteFile};
use futures::stream::{self, Stream, StreamExt};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn remote_file(id: &str, name: &str, mime_type: Option<&str>) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: mime_type.map(str::to_string),
        ..Default::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(String),
    Get(String),
    Create {
        metadata: FileSpec,
        media: Option<Media>,
    },
    Update {
        id: String,
        metadata: FileSpec,
        media: Option<Media>,
    },
    Download(String),
    Export {
        id: String,
        mime_type: String,
    },
    Delete(String),
}

#[derive(Default)]
pub struct FakeStore {
    results: Mutex<HashMap<String, Vec<RemoteFile>>>,
    failing_searches: Mutex<HashMap<String, Vec<RemoteFile>>>,
    files: Mutex<HashMap<String, RemoteFile>>,
    contents: Mutex<HashMap<String, Vec<Bytes>>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_fetches: Mutex<HashSet<String>>,
    fail_writes: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
    released: Arc<AtomicUsize>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `files`.
    pub fn with_search(self, query: &str, files: Vec<RemoteFile>) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_string(), files);
        self
    }

    /// Fail `query` after having found `partial`.
    pub fn with_failing_search(self, query: &str, partial: Vec<RemoteFile>) -> Self {
        self.failing_searches
            .lock()
            .unwrap()
            .insert(query.to_string(), partial);
        self
    }

    /// Make `file` retrievable by id, with its content split in `chunks`.
    pub fn with_file(self, file: RemoteFile, chunks: &[&str]) -> Self {
        self.contents.lock().unwrap().insert(
            file.id.clone(),
            chunks.iter().map(|c| Bytes::from(c.to_string())).collect(),
        );
        self.files.lock().unwrap().insert(file.id.clone(), file);
        self
    }

    /// Reading `id` yields its chunks and then an error.
    pub fn with_failing_read(self, id: &str) -> Self {
        self.failing_reads.lock().unwrap().insert(id.to_string());
        self
    }

    /// Opening a download or export stream for `id` fails with a 403.
    pub fn with_failing_fetch(self, id: &str) -> Self {
        self.failing_fetches.lock().unwrap().insert(id.to_string());
        self
    }

    /// Every create and update fails with a 403.
    pub fn with_failing_writes(self) -> Self {
        *self.fail_writes.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .collect()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    /// How many content streams have been dropped.
    pub fn released_streams(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_writes(&self) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(DriveError::ApiError {
                status: 403,
                message: "The user does not have sufficient permissions".to_string(),
            });
        }
        Ok(())
    }

    fn stream_for(&self, id: &str) -> Result<ByteStream> {
        if self.failing_fetches.lock().unwrap().contains(id) {
            return Err(DriveError::ApiError {
                status: 403,
                message: "The download quota for this file has been exceeded".to_string(),
            });
        }

        let chunks = self
            .contents
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DriveError::FileNotFound(id.to_string()))?;

        let mut items: Vec<Result<Bytes>> = chunks.into_iter().map(Ok).collect();
        if self.failing_reads.lock().unwrap().contains(id) {
            items.push(Err(DriveError::ApiError {
                status: 500,
                message: "connection reset".to_string(),
            }));
        }

        Ok(TrackedStream {
            inner: stream::iter(items).boxed(),
            released: Arc::clone(&self.released),
        }
        .boxed())
    }
}

/// Counts drops so tests can check that streams are released.
struct TrackedStream {
    inner: ByteStream,
    released: Arc<AtomicUsize>,
}

impl Stream for TrackedStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn search(&self, query: &str) -> Result<Vec<RemoteFile>> {
        self.record(Call::Search(query.to_string()));

        if let Some(partial) = self.failing_searches.lock().unwrap().get(query) {
            return Err(DriveError::SearchFailed {
                partial: partial.clone(),
                source: Box::new(DriveError::ApiError {
                    status: 500,
                    message: "Internal Error".to_string(),
                }),
            });
        }

        Ok(self
            .results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }

    async fn get(&self, id: &str) -> Result<RemoteFile> {
        self.record(Call::Get(id.to_string()));
        self.files
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DriveError::FileNotFound(id.to_string()))
    }

    async fn create(&self, metadata: &FileSpec, media: Option<Media>) -> Result<RemoteFile> {
        self.record(Call::Create {
            metadata: metadata.clone(),
            media: media.clone(),
        });
        self.check_writes()?;

        let mut files = self.files.lock().unwrap();
        let file = RemoteFile {
            id: format!("new-{}", files.len() + 1),
            name: metadata.name.clone().unwrap_or_default(),
            mime_type: metadata
                .mime_type
                .clone()
                .or_else(|| media.map(|m| m.content_type)),
            parents: metadata.parents.clone(),
            ..Default::default()
        };
        files.insert(file.id.clone(), file.clone());
        Ok(file)
    }

    async fn update(
        &self,
        id: &str,
        metadata: &FileSpec,
        media: Option<Media>,
    ) -> Result<RemoteFile> {
        self.record(Call::Update {
            id: id.to_string(),
            metadata: metadata.clone(),
            media,
        });
        self.check_writes()?;

        Ok(self
            .files
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_else(|| remote_file(id, "", None)))
    }

    async fn download(&self, id: &str) -> Result<ByteStream> {
        self.record(Call::Download(id.to_string()));
        self.stream_for(id)
    }

    async fn export(&self, id: &str, mime_type: &str) -> Result<ByteStream> {
        self.record(Call::Export {
            id: id.to_string(),
            mime_type: mime_type.to_string(),
        });
        self.stream_for(id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record(Call::Delete(id.to_string()));
        match self.files.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(DriveError::ApiError {
                status: 404,
                message: format!("File not found: {}.", id),
            }),
        }
    }
}
