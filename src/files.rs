//! Name-addressed file operations on top of a `RemoteStore`.
//!
//! Files are located by name and parent folder rather than by id. CSV
//! content gets special treatment in both directions: uploads ask Drive to
//! convert it into a Google Sheets document, and Sheets documents are
//! exported back as CSV on download.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::content_type::{is_csv, ContentTypes, OCTET_STREAM};
use crate::error::{DriveError, Result};
use crate::export::{DownloadPlan, ExportFormats};
use crate::models::{FileSpec, RemoteFile, FOLDER_MIME_TYPE, SPREADSHEET_MIME_TYPE};
use crate::query::name_query;
use crate::store::{ByteStream, Media, RemoteStore};

/// Suffix Drive drops from a file name when it converts a CSV upload.
const CSV_SUFFIX: &str = ".csv";

/// File operations addressed by name and parent folder.
pub struct DriveFiles<S> {
    store: S,
    content_types: ContentTypes,
    export_formats: ExportFormats,
}

impl<S: RemoteStore> DriveFiles<S> {
    /// Wrap `store` using the default content type and export tables.
    pub fn new(store: S) -> Self {
        Self {
            store,
            content_types: ContentTypes::default(),
            export_formats: ExportFormats::default(),
        }
    }

    pub fn with_content_types(mut self, content_types: ContentTypes) -> Self {
        self.content_types = content_types;
        self
    }

    pub fn with_export_formats(mut self, export_formats: ExportFormats) -> Self {
        self.export_formats = export_formats;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Search all files visible to the user.
    ///
    /// `query` uses the Drive search syntax. On failure the error carries any
    /// files found before it, see `DriveError::partial_results`.
    pub async fn search(&self, query: &str) -> Result<Vec<RemoteFile>> {
        self.store.search(query).await
    }

    /// All files named exactly `name` in `parent_id`.
    ///
    /// An empty `parent_id` searches every folder. No match is an empty list.
    pub async fn files_named(&self, name: &str, parent_id: &str) -> Result<Vec<RemoteFile>> {
        self.search(&name_query(name, parent_id)).await
    }

    /// Like `files_named`, but a `.csv` name with no match is retried without
    /// the suffix, since a converted upload loses its extension.
    pub async fn find_by_name(&self, name: &str, parent_id: &str) -> Result<Vec<RemoteFile>> {
        let files = self.files_named(name, parent_id).await?;
        if !files.is_empty() {
            return Ok(files);
        }

        match csv_stem(name) {
            Some(stem) => {
                debug!(name, stem, parent_id, "no exact match, retrying without .csv");
                self.files_named(stem, parent_id).await
            }
            None => Ok(files),
        }
    }

    /// Create a folder. An existing folder with the same name is not reused.
    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Result<RemoteFile> {
        let metadata = FileSpec::new(name, parent_id).with_mime_type(FOLDER_MIME_TYPE);

        info!(name, parent_id, "creating folder");
        self.store
            .create(&metadata, None)
            .await
            .map_err(|err| DriveError::CreateFailed {
                name: name.to_string(),
                source: Box::new(err),
            })
    }

    /// Create a new file, never touching existing files of the same name.
    ///
    /// A `.csv` name is stored as a Google Sheets document; the bytes are
    /// still sent as CSV and Drive converts them. Without `content` only the
    /// metadata is created.
    pub async fn create_file(
        &self,
        name: &str,
        parent_id: &str,
        content: Option<Bytes>,
    ) -> Result<RemoteFile> {
        let content_type = self.content_types.for_name(name);
        let convert = content_type.as_deref().is_some_and(is_csv);

        let mut metadata = FileSpec::new(name, parent_id);
        if convert {
            metadata = metadata.with_mime_type(SPREADSHEET_MIME_TYPE);
        }
        let media = content.map(|data| media_for(content_type, data));

        info!(name, parent_id, convert, "creating file");
        self.store
            .create(&metadata, media)
            .await
            .map_err(|err| DriveError::CreateFailed {
                name: name.to_string(),
                source: Box::new(err),
            })
    }

    /// Replace the content of file `id`.
    ///
    /// `name` only selects the upload content type; the remote name is kept.
    /// Without `content` nothing on the file changes.
    pub async fn update_file(
        &self,
        id: &str,
        name: &str,
        content: Option<Bytes>,
    ) -> Result<RemoteFile> {
        let media = content.map(|data| media_for(self.content_types.for_name(name), data));

        info!(id, name, "updating file");
        self.store
            .update(id, &FileSpec::default(), media)
            .await
            .map_err(|err| DriveError::UpdateFailed {
                id: id.to_string(),
                source: Box::new(err),
            })
    }

    /// Update the file named `name` in `parent_id`, or create it.
    ///
    /// With several matches the first one listed is updated; which one that
    /// is depends on the store's ordering.
    pub async fn create_or_update_file(
        &self,
        name: &str,
        parent_id: &str,
        content: Option<Bytes>,
    ) -> Result<RemoteFile> {
        let existing = self.find_by_name(name, parent_id).await?;

        match existing.first() {
            Some(file) => {
                if existing.len() > 1 {
                    warn!(name, parent_id, matches = existing.len(), chosen = %file.id, "several files share this name");
                }
                debug!(name, id = %file.id, "existing file found");
                self.update_file(&file.id, name, content).await
            }
            None => {
                debug!(name, parent_id, "no existing file");
                self.create_file(name, parent_id, content).await
            }
        }
    }

    /// All metadata for file `id`.
    pub async fn get_info(&self, id: &str) -> Result<RemoteFile> {
        self.store.get(id).await
    }

    /// Stream the content of file `id`.
    ///
    /// Google Workspace files are exported using the export format table,
    /// so a Sheets document comes back as CSV.
    pub async fn download_file(&self, id: &str) -> Result<ByteStream> {
        let (_, stream) = self.open(id).await?;
        Ok(stream)
    }

    /// Download and return the whole content of file `id`.
    pub async fn file_contents(&self, id: &str) -> Result<Vec<u8>> {
        let mut stream = self.download_file(id).await?;
        let mut contents = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| DriveError::ReadFailed {
                id: id.to_string(),
                source: Box::new(err),
            })?;
            contents.extend_from_slice(&chunk);
        }

        Ok(contents)
    }

    pub async fn delete_file(&self, id: &str) -> Result<()> {
        info!(id, "deleting file");
        self.store
            .delete(id)
            .await
            .map_err(|err| DriveError::DeleteFailed {
                id: id.to_string(),
                source: Box::new(err),
            })
    }

    /// Create or update a file in `parent_id` from a local file, keeping its name.
    pub async fn upload_path<P: AsRef<Path>>(
        &self,
        local_path: P,
        parent_id: &str,
    ) -> Result<RemoteFile> {
        let local_path = local_path.as_ref();
        let filename = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                invalid_input(format!(
                    "{} has no usable file name",
                    local_path.display()
                ))
            })?;

        let data = tokio::fs::read(local_path).await?;
        self.create_or_update_file(filename, parent_id, Some(Bytes::from(data)))
            .await
    }

    /// Download file `id` to a local path.
    ///
    /// If `destination` is a directory the last component of the remote file
    /// name is used inside it, so the file never lands outside `destination`.
    /// Returns the path written.
    pub async fn download_to_path<P: AsRef<Path>>(
        &self,
        id: &str,
        destination: P,
    ) -> Result<PathBuf> {
        let destination = destination.as_ref();
        let (metadata, mut stream) = self.open(id).await?;

        let final_path = if destination.is_dir() {
            let file_name = Path::new(&metadata.name).file_name().ok_or_else(|| {
                invalid_input(format!(
                    "remote name {:?} of {} has no usable file name",
                    metadata.name, id
                ))
            })?;
            destination.join(file_name)
        } else {
            destination.to_path_buf()
        };

        // Stream to file
        let mut file = File::create(&final_path).await?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| DriveError::ReadFailed {
                id: id.to_string(),
                source: Box::new(err),
            })?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        info!(id, path = %final_path.display(), "downloaded file");
        Ok(final_path)
    }

    async fn open(&self, id: &str) -> Result<(RemoteFile, ByteStream)> {
        let metadata = self.get_info(id).await?;

        let stream = match self.export_formats.plan(&metadata) {
            DownloadPlan::Export { mime_type } => {
                debug!(id, from = ?metadata.mime_type, to = %mime_type, "exporting");
                self.store
                    .export(id, &mime_type)
                    .await
                    .map_err(|err| DriveError::ExportFailed {
                        id: id.to_string(),
                        mime_type: mime_type.clone(),
                        source: Box::new(err),
                    })?
            }
            DownloadPlan::Direct => {
                self.store
                    .download(id)
                    .await
                    .map_err(|err| DriveError::DownloadFailed {
                        id: id.to_string(),
                        source: Box::new(err),
                    })?
            }
        };

        Ok((metadata, stream))
    }
}

fn invalid_input(message: String) -> DriveError {
    DriveError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message,
    ))
}

fn media_for(content_type: Option<String>, data: Bytes) -> Media {
    Media::new(
        content_type.unwrap_or_else(|| OCTET_STREAM.to_string()),
        data,
    )
}

/// `name` without a trailing `.csv` (any case), if it has one and something is left.
fn csv_stem(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(CSV_SUFFIX.len())?;
    let suffix = name.get(split..)?;
    if split == 0 || !suffix.eq_ignore_ascii_case(CSV_SUFFIX) {
        return None;
    }
    Some(&name[..split])
}
