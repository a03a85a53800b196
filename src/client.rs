//! Google Drive API v3 implementation of `RemoteStore`.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::auth::TokenSource;
use crate::config::ClientConfig;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, FileListResponse, FileSpec, RemoteFile};
use crate::store::{ByteStream, Media, RemoteStore};

/// Fields requested per file when searching.
const SEARCH_FIELDS: &str = "nextPageToken, files(id, name, parents, shared)";

/// Fields returned from create and update calls.
const FILE_FIELDS: &str = "id, name, parents, mimeType, shared, size, webViewLink";

/// Client for the Google Drive files endpoints.
pub struct DriveApiClient {
    config: ClientConfig,
    auth: Arc<dyn TokenSource>,
    http: Client,
}

impl DriveApiClient {
    /// Create a new DriveApiClient.
    ///
    /// # Arguments
    /// * `auth` - Source of access tokens
    /// * `config` - Endpoints and upload settings
    pub fn new<T>(auth: T, config: ClientConfig) -> Self
    where
        T: TokenSource + 'static,
    {
        Self {
            config,
            auth: Arc::new(auth),
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.config.api_base)
    }

    fn file_url(&self, id: &str) -> String {
        format!("{}/files/{}", self.config.api_base, id)
    }

    async fn request(&self, method: Method, url: String) -> Result<RequestBuilder> {
        let token = self.auth.access_token().await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")]))
    }

    async fn search_page(&self, query: &str, page_token: Option<&str>) -> Result<FileListResponse> {
        let mut request = self
            .request(Method::GET, self.files_url())
            .await?
            .query(&[
                ("q", query),
                ("fields", SEARCH_FIELDS),
                ("includeItemsFromAllDrives", "true"),
            ]);

        if let Some(drive_id) = &self.config.drive_id {
            request = request.query(&[("driveId", drive_id.as_str()), ("corpora", "drive")]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Send metadata and content, picking multipart or resumable by size.
    async fn upload(
        &self,
        method: Method,
        url: String,
        metadata: &FileSpec,
        media: Media,
    ) -> Result<RemoteFile> {
        if media.len() as u64 > self.config.resumable_threshold {
            self.upload_resumable(method, url, metadata, media).await
        } else {
            self.upload_multipart(method, url, metadata, media).await
        }
    }

    /// Upload using multipart upload (for smaller files).
    async fn upload_multipart(
        &self,
        method: Method,
        url: String,
        metadata: &FileSpec,
        media: Media,
    ) -> Result<RemoteFile> {
        let metadata_part = Part::text(serde_json::to_string(metadata)?)
            .mime_str("application/json")?;

        let file_name = metadata.name.clone().unwrap_or_else(|| "file".to_string());
        let file_part = Part::bytes(media.data.to_vec())
            .file_name(file_name)
            .mime_str(&media.content_type)?;

        let form = Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .request(method, url)
            .await?
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .multipart(form)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Upload using resumable upload (for larger files).
    async fn upload_resumable(
        &self,
        method: Method,
        url: String,
        metadata: &FileSpec,
        media: Media,
    ) -> Result<RemoteFile> {
        // Step 1: Initiate resumable upload
        let init_response = self
            .request(method, url)
            .await?
            .query(&[("uploadType", "resumable")])
            .header("X-Upload-Content-Type", media.content_type.as_str())
            .header("X-Upload-Content-Length", media.len().to_string())
            .json(metadata)
            .send()
            .await?;

        let init_response = check_status(init_response).await?;
        let upload_url = init_response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DriveError::ApiError {
                status: 500,
                message: "No upload URL in response".to_string(),
            })?
            .to_string();

        // Step 2: Upload the file content
        let upload_response = self
            .http
            .put(&upload_url)
            .header("Content-Type", media.content_type.as_str())
            .query(&[("fields", FILE_FIELDS)])
            .body(media.data)
            .send()
            .await?;

        Ok(check_status(upload_response).await?.json().await?)
    }

    /// Send metadata only, without content.
    async fn write_metadata(
        &self,
        method: Method,
        url: String,
        metadata: &FileSpec,
    ) -> Result<RemoteFile> {
        let response = self
            .request(method, url)
            .await?
            .query(&[("fields", FILE_FIELDS)])
            .json(metadata)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl RemoteStore for DriveApiClient {
    async fn search(&self, query: &str) -> Result<Vec<RemoteFile>> {
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self.search_page(query, page_token.as_deref()).await {
                Ok(page) => page,
                Err(err) => {
                    warn!(query, found = all_files.len(), error = %err, "search failed");
                    return Err(DriveError::SearchFailed {
                        partial: all_files,
                        source: Box::new(err),
                    });
                }
            };
            all_files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(query, count = all_files.len(), "search complete");
        Ok(all_files)
    }

    async fn get(&self, id: &str) -> Result<RemoteFile> {
        let response = self
            .request(Method::GET, self.file_url(id))
            .await?
            .query(&[("fields", "*")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DriveError::FileNotFound(id.to_string()));
        }

        Ok(check_status(response).await?.json().await?)
    }

    async fn create(&self, metadata: &FileSpec, media: Option<Media>) -> Result<RemoteFile> {
        let metadata = metadata.without_empty_parents();
        match media {
            Some(media) => {
                let url = format!("{}/files", self.config.upload_base);
                self.upload(Method::POST, url, &metadata, media).await
            }
            None => {
                self.write_metadata(Method::POST, self.files_url(), &metadata)
                    .await
            }
        }
    }

    async fn update(
        &self,
        id: &str,
        metadata: &FileSpec,
        media: Option<Media>,
    ) -> Result<RemoteFile> {
        let metadata = metadata.without_empty_parents();
        match media {
            Some(media) => {
                let url = format!("{}/files/{}", self.config.upload_base, id);
                self.upload(Method::PATCH, url, &metadata, media).await
            }
            None => {
                self.write_metadata(Method::PATCH, self.file_url(id), &metadata)
                    .await
            }
        }
    }

    async fn download(&self, id: &str) -> Result<ByteStream> {
        let response = self
            .request(Method::GET, self.file_url(id))
            .await?
            .query(&[("alt", "media")])
            .send()
            .await?;

        Ok(body_stream(check_status(response).await?))
    }

    async fn export(&self, id: &str, mime_type: &str) -> Result<ByteStream> {
        let response = self
            .request(Method::GET, format!("{}/export", self.file_url(id)))
            .await?
            .query(&[("mimeType", mime_type)])
            .send()
            .await?;

        Ok(body_stream(check_status(response).await?))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.file_url(id))
            .await?
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into `DriveError::ApiError`.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

fn body_stream(response: Response) -> ByteStream {
    response
        .bytes_stream()
        .map(|chunk| chunk.map_err(DriveError::from))
        .boxed()
}
