//! Object storage path scheme.
//!
//! Objects live under the owner's id, prefixed with the upload time so
//! repeated uploads of the same name never collide:
//!
//! ```text
//! {user_id}/{unix_millis}_{file_name}
//! ```

use uuid::Uuid;

/// Builds the storage path for a newly uploaded file.
pub fn file_storage_path(user_id: Uuid, uploaded_at_ms: i64, file_name: &str) -> String {
    format!("{user_id}/{uploaded_at_ms}_{}", sanitize_file_name(file_name))
}

/// Replaces path separators and control characters so a client-supplied
/// name can never escape the owner's prefix.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
