//! Data models for Google Drive API requests and responses.

use serde::{Deserialize, Serialize};

/// Prefix shared by every Google Workspace (native document) MIME type.
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps";

/// MIME type of a Drive folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME type of a Google Sheets document. Requesting it on create converts CSV uploads.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Metadata for a file or folder in Google Drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl RemoteFile {
    /// True for Google Workspace kinds, which have no byte content and must be exported.
    pub fn is_native(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with(NATIVE_MIME_PREFIX))
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    /// The native kind ("spreadsheet", "drawing", ...), i.e. the text after the last `.`.
    pub fn native_subtype(&self) -> Option<&str> {
        let mime = self.mime_type.as_deref()?;
        if !mime.starts_with(NATIVE_MIME_PREFIX) {
            return None;
        }
        mime.rsplit('.').next()
    }
}

impl std::fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = self
            .size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let mime = self.mime_type.as_deref().unwrap_or("-");
        write!(f, "{}\t{}\t{}\t{}", self.id, size_str, mime, self.name)
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Metadata sent with a create or update request.
///
/// Unset fields are left out of the request body, so an update with a
/// default `FileSpec` leaves the remote metadata untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl FileSpec {
    /// Metadata for a new entry named `name` inside `parent_id`.
    pub fn new(name: &str, parent_id: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            mime_type: None,
            parents: vec![parent_id.to_string()],
        }
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }

    /// Copy without empty parent ids; the API rejects `""` where the root is meant.
    pub fn without_empty_parents(&self) -> Self {
        Self {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            parents: self
                .parents
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
        }
    }
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<RemoteFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}
