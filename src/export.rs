//! Choosing between a direct download and an export.
//!
//! Google Workspace files have no byte content of their own and can only be
//! fetched through the export endpoint in a conventional format. See
//! <https://developers.google.com/drive/api/v3/ref-export-formats>.

use std::collections::HashMap;

use crate::models::RemoteFile;

/// Export type used for native kinds missing from the table.
pub const DEFAULT_EXPORT_TYPE: &str = "text/plain";

/// How the bytes of a file are to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPlan {
    /// Regular file: fetch its content as stored.
    Direct,
    /// Native document: ask the store to convert it to `mime_type`.
    Export { mime_type: String },
}

/// Native subtype to export content type.
#[derive(Debug, Clone)]
pub struct ExportFormats {
    formats: HashMap<String, String>,
    fallback: String,
}

impl Default for ExportFormats {
    fn default() -> Self {
        Self::empty()
            .with_format("spreadsheet", "text/csv")
            .with_format("drawing", "text/svg")
    }
}

impl ExportFormats {
    /// A table with no entries; every native kind exports as plain text.
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
            fallback: DEFAULT_EXPORT_TYPE.to_string(),
        }
    }

    pub fn with_format(mut self, subtype: &str, mime_type: &str) -> Self {
        self.formats
            .insert(subtype.to_string(), mime_type.to_string());
        self
    }

    pub fn with_fallback(mut self, mime_type: &str) -> Self {
        self.fallback = mime_type.to_string();
        self
    }

    /// Export type for a native subtype such as `spreadsheet`.
    pub fn export_type(&self, subtype: &str) -> &str {
        self.formats
            .get(subtype)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Decide how to fetch `file` from its metadata.
    pub fn plan(&self, file: &RemoteFile) -> DownloadPlan {
        match file.native_subtype() {
            Some(subtype) => DownloadPlan::Export {
                mime_type: self.export_type(subtype).to_string(),
            },
            None => DownloadPlan::Direct,
        }
    }
}
