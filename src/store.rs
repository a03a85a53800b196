//! The remote store capability the file operations are built on.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::models::{FileSpec, RemoteFile};

/// Streamed file content. Dropping the stream releases the underlying response.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Content to upload together with its transfer content type.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub content_type: String,
    pub data: Bytes,
}

impl Media {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Low-level file operations against a remote store.
///
/// `DriveApiClient` talks to Google Drive over HTTP; tests substitute an
/// in-memory implementation.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Run a search and return every matching file across all result pages.
    ///
    /// A failure part way returns `DriveError::SearchFailed` carrying the
    /// files gathered so far.
    async fn search(&self, query: &str) -> Result<Vec<RemoteFile>>;

    /// Fetch all metadata for a file. A missing id is `DriveError::FileNotFound`.
    async fn get(&self, id: &str) -> Result<RemoteFile>;

    async fn create(&self, metadata: &FileSpec, media: Option<Media>) -> Result<RemoteFile>;

    async fn update(
        &self,
        id: &str,
        metadata: &FileSpec,
        media: Option<Media>,
    ) -> Result<RemoteFile>;

    /// Stream a regular file's content as stored.
    async fn download(&self, id: &str) -> Result<ByteStream>;

    /// Stream a native document converted to `mime_type`.
    async fn export(&self, id: &str, mime_type: &str) -> Result<ByteStream>;

    async fn delete(&self, id: &str) -> Result<()>;
}
