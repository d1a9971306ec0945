/// A file that has been written to the storage directory.
///
/// Only `stored_name` is meaningful after the request finishes; the other fields exist for
/// logging and for rendering the upload response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated name, unique within the storage directory with high probability
    pub stored_name: String,
    /// Client-supplied name, used for display only
    pub original_name: String,
    pub size_bytes: u64,
    /// Content type inferred from the extension, as the static server will serve it
    pub content_type: String,
}
