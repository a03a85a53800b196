//! Error types for the drive_files crate.

use thiserror::Error;

use crate::models::RemoteFile;

/// Errors that can occur when working with files in Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A listing failed part way; `partial` holds the files gathered before the failure.
    #[error("Search failed after {} result(s): {source}", .partial.len())]
    SearchFailed {
        partial: Vec<RemoteFile>,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Failed to create '{name}': {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Failed to update {id}: {source}")]
    UpdateFailed {
        id: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Failed to export {id} as {mime_type}: {source}")]
    ExportFailed {
        id: String,
        mime_type: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Failed to download {id}: {source}")]
    DownloadFailed {
        id: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Failed to delete {id}: {source}")]
    DeleteFailed {
        id: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Failed to read contents of {id}: {source}")]
    ReadFailed {
        id: String,
        #[source]
        source: Box<DriveError>,
    },
}

impl DriveError {
    /// Files found before a search failed. Empty for every other error.
    pub fn partial_results(&self) -> &[RemoteFile] {
        match self {
            DriveError::SearchFailed { partial, .. } => partial,
            _ => &[],
        }
    }

    /// Consume the error, keeping whatever a failed search had already found.
    pub fn into_partial_results(self) -> Vec<RemoteFile> {
        match self {
            DriveError::SearchFailed { partial, .. } => partial,
            _ => Vec::new(),
        }
    }

    /// True when the error means the requested id does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            DriveError::FileNotFound(_) => true,
            DriveError::ApiError { status, .. } => *status == 404,
            DriveError::SearchFailed { source, .. }
            | DriveError::CreateFailed { source, .. }
            | DriveError::UpdateFailed { source, .. }
            | DriveError::ExportFailed { source, .. }
            | DriveError::DownloadFailed { source, .. }
            | DriveError::DeleteFailed { source, .. }
            | DriveError::ReadFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
