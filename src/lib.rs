//! drive_files - name-addressed file operations for Google Drive.
//!
//! This library provides functionality to:
//! - Find files by name within a folder
//! - Create a file, or replace the content of an existing file with the same name
//! - Upload CSV data as Google Sheets documents, and export them back as CSV
//! - Download files, exporting Google Workspace documents to a text format
//!
//! # Example
//!
//! ```no_run
//! use drive_files::{ClientConfig, DriveApiClient, DriveFiles, StaticToken};
//!
//! #[tokio::main]
//! async fn main() -> drive_files::Result<()> {
//!     let client = DriveApiClient::new(StaticToken::from_env()?, ClientConfig::from_env()?);
//!     let files = DriveFiles::new(client);
//!
//!     let sheet = files
//!         .create_or_update_file("data.csv", "folder-id", Some("a,b\n1,2\n".into()))
//!         .await?;
//!     let csv = files.file_contents(&sheet.id).await?;
//!     println!("{}", String::from_utf8_lossy(&csv));
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod content_type;
pub mod error;
pub mod export;
pub mod files;
pub mod models;
pub mod query;
pub mod store;

// Re-exports for convenience
pub use auth::{StaticToken, TokenSource};
pub use client::DriveApiClient;
pub use config::ClientConfig;
pub use content_type::ContentTypes;
pub use error::{DriveError, Result};
pub use export::{DownloadPlan, ExportFormats};
pub use files::DriveFiles;
pub use models::{FileSpec, RemoteFile};
pub use store::{ByteStream, Media, RemoteStore};
