//! Connection settings for `DriveApiClient`.

use crate::error::{DriveError, Result};

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload URL for Google Drive API.
pub const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Threshold for resumable upload (500 MB).
pub const RESUMABLE_THRESHOLD: u64 = 500 * 1024 * 1024;

/// Settings for the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub upload_base: String,
    /// Restrict searches to this Shared Drive.
    pub drive_id: Option<String>,
    /// Uploads larger than this many bytes use the resumable protocol.
    pub resumable_threshold: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: UPLOAD_API_BASE.to_string(),
            drive_id: None,
            resumable_threshold: RESUMABLE_THRESHOLD,
        }
    }
}

impl ClientConfig {
    /// Point both endpoints at `base_url`, with uploads under `/upload`.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            api_base: base.to_string(),
            upload_base: format!("{}/upload", base),
            ..Self::default()
        }
    }

    pub fn with_drive_id(mut self, drive_id: impl Into<String>) -> Self {
        self.drive_id = Some(drive_id.into());
        self
    }

    pub fn with_resumable_threshold(mut self, bytes: u64) -> Self {
        self.resumable_threshold = bytes;
        self
    }

    /// Build a config from process environment variables.
    ///
    /// - `DRIVE_API_BASE` / `DRIVE_UPLOAD_BASE`: endpoint overrides
    /// - `SHARED_DRIVE_ID`: restrict searches to a Shared Drive
    /// - `DRIVE_RESUMABLE_THRESHOLD`: bytes
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(base) = non_empty("DRIVE_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = non_empty("DRIVE_UPLOAD_BASE") {
            config.upload_base = base.trim_end_matches('/').to_string();
        }
        config.drive_id = non_empty("SHARED_DRIVE_ID");
        if let Some(raw) = non_empty("DRIVE_RESUMABLE_THRESHOLD") {
            config.resumable_threshold = raw.trim().parse().map_err(|_| {
                DriveError::InvalidConfig(format!(
                    "DRIVE_RESUMABLE_THRESHOLD must be a byte count, got {:?}",
                    raw
                ))
            })?;
        }

        Ok(config)
    }
}
