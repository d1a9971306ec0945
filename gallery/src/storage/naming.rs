//! Stored-name generation.
//!
//! The default [`TimestampNaming`] strategy names a file `<unix millis><.ext>`, keeping the
//! client's extension so the static server can infer a content type. Nothing else from the
//! client-supplied name reaches the filesystem.
//!
//! Two uploads landing in the same millisecond get the same name and the later write replaces
//! the earlier file. No counter or random suffix is mixed in, so uniqueness only holds for
//! uploads more than a millisecond apart. Failed requests remove their files by stored name, so a
//! collision with a concurrent request can also remove that request's file.

use chrono::Utc;

/// Maps a client-supplied filename to the name it is stored under.
pub trait NameGenerator: Send + Sync {
    fn generate(&self, original_name: &str) -> String;
}

/// `<current unix time in milliseconds><extension of the original name>`
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampNaming;

impl NameGenerator for TimestampNaming {
    fn generate(&self, original_name: &str) -> String {
        format!("{}{}", Utc::now().timestamp_millis(), extension_of(original_name))
    }
}

/// Extension of the final path component of `original_name`, including the leading dot.
///
/// Returns an empty string when there is no extension, when the only dot is the first
/// character (`.bashrc`), or when the extension contains anything but ASCII alphanumerics.
pub fn extension_of(original_name: &str) -> &str {
    let base = original_name.rsplit(['/', '\\']).next().unwrap_or(original_name);

    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => {
            let ext = &base[idx..];
            if ext.len() > 1 && ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
                ext
            } else {
                ""
            }
        }
    }
}
