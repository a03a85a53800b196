//! Search expressions for the files.list `q` parameter.
//!
//! See <https://developers.google.com/drive/api/v3/ref-search-terms>.

/// Escape a literal for embedding inside single quotes in a query.
///
/// Backslashes are escaped before quotes so the backslashes inserted for
/// quotes are not escaped a second time.
pub fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Build a query matching files named exactly `name`.
///
/// When `parent_id` is empty the search is not restricted to a folder.
pub fn name_query(name: &str, parent_id: &str) -> String {
    let mut query = format!("name = '{}'", escape_query(name));
    if !parent_id.is_empty() {
        query.push_str(&format!(" and '{}' in parents", parent_id));
    }
    query
}
