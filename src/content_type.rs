//! Upload content types derived from file names.

use std::collections::HashMap;

/// Content type used for CSV uploads, regardless of what the platform table says.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Fallback media type when an extension is unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension to content-type resolution with a fixed override table.
///
/// Overrides are keyed by lowercased extension without the leading dot and
/// are consulted before `mime_guess`.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    overrides: HashMap<String, String>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::empty().with_override("csv", CSV_CONTENT_TYPE)
    }
}

impl ContentTypes {
    /// A resolver with no overrides; everything goes through `mime_guess`.
    pub fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, extension: &str, content_type: &str) -> Self {
        self.overrides
            .insert(normalize_extension(extension), content_type.to_string());
        self
    }

    /// Resolve a content type for `extension` (leading dot optional, any case).
    ///
    /// Returns `None` when neither the overrides nor `mime_guess` know it.
    pub fn resolve(&self, extension: &str) -> Option<String> {
        let ext = normalize_extension(extension);
        if ext.is_empty() {
            return None;
        }
        if let Some(content_type) = self.overrides.get(&ext) {
            return Some(content_type.clone());
        }
        mime_guess::from_ext(&ext).first_raw().map(str::to_string)
    }

    /// Resolve a content type from the extension of a file name.
    pub fn for_name(&self, name: &str) -> Option<String> {
        self.resolve(extension_of(name))
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// True for any CSV content type, with or without parameters.
pub fn is_csv(content_type: &str) -> bool {
    content_type.contains("text/csv")
}

/// The extension of `name` without the dot, or `""` if it has none.
///
/// Only the final path element is considered, so `a.b/c` has no extension.
pub fn extension_of(name: &str) -> &str {
    match name.rfind(&['.', '/'][..]) {
        Some(idx) if name[idx..].starts_with('.') => &name[idx + 1..],
        _ => "",
    }
}
