use crate::AppState;
use crate::api::models::uploads::UploadLink;
use crate::errors::{Error, Result};
use crate::storage::{errors::StorageError, models::StoredFile};
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::Html,
};
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, instrument, warn};

/// Multipart field carrying the file for `POST /upload`
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the files for `POST /gallery`
pub const GALLERY_FIELD: &str = "gallery";

/// Upload a single image from the `image` field.
///
/// Responds with an HTML snippet linking to the stored file, or 400 `No file uploaded.` when the
/// request carries no file.
#[instrument(skip_all)]
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<Html<String>> {
    let mut files = receive_files(&state, &mut multipart, IMAGE_FIELD, 1, "Unexpected field").await?;

    let Some(file) = files.pop() else {
        return Err(Error::BadRequest {
            message: "No file uploaded.".to_string(),
        });
    };

    let link = UploadLink::from_stored(&state.config.storage, &file);
    let body = state.views.upload_success(&link).map_err(|e| Error::Other(e.into()))?;

    Ok(Html(body))
}

/// Upload up to `uploads.max_gallery_files` images from the `gallery` field.
///
/// Every file gets its own stored name. Either all files are stored or, on any failure
/// (including one file too many), none are.
#[instrument(skip_all)]
pub async fn upload_gallery(State(state): State<AppState>, mut multipart: Multipart) -> Result<Html<String>> {
    let max_files = state.config.uploads.max_gallery_files;
    let overflow = format!("Too many files. At most {max_files} files may be uploaded at once.");

    let files = receive_files(&state, &mut multipart, GALLERY_FIELD, max_files, &overflow).await?;

    if files.is_empty() {
        return Err(Error::BadRequest {
            message: "No files uploaded.".to_string(),
        });
    }

    info!(count = files.len(), "Gallery upload stored");

    let links: Vec<UploadLink> = files
        .iter()
        .map(|file| UploadLink::from_stored(&state.config.storage, file))
        .collect();
    let body = state.views.gallery_success(&links).map_err(|e| Error::Other(e.into()))?;

    Ok(Html(body))
}

/// Stream every file part of `field_name` into storage, at most `max_files` of them.
///
/// Parts without a filename are ordinary text fields and are skipped. A file under any other
/// field name, or one file more than `max_files`, fails the request with 400. On any error the
/// files already stored for this request are removed before returning.
async fn receive_files(
    state: &AppState,
    multipart: &mut Multipart,
    field_name: &str,
    max_files: usize,
    overflow_message: &str,
) -> Result<Vec<StoredFile>> {
    let mut placed = Vec::new();

    match receive_into(state, multipart, field_name, max_files, overflow_message, &mut placed).await {
        Ok(()) => Ok(placed),
        Err(e) => {
            discard(state, &placed).await;
            Err(e)
        }
    }
}

async fn receive_into(
    state: &AppState,
    multipart: &mut Multipart,
    field_name: &str,
    max_files: usize,
    overflow_message: &str,
    placed: &mut Vec<StoredFile>,
) -> Result<()> {
    let mut seen_part = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // A form with no parts fails to parse as an incomplete stream; it carries no file
            Err(e) if !seen_part && e.status() != StatusCode::PAYLOAD_TOO_LARGE => {
                debug!(error = %e.body_text(), "Multipart body carries no parts");
                break;
            }
            Err(e) => return Err(multipart_error(&e)),
        };
        seen_part = true;

        // Browsers send an empty filename when no file was chosen
        let Some(original_name) = field.file_name().filter(|name| !name.is_empty()).map(str::to_owned) else {
            continue;
        };

        if field.name() != Some(field_name) {
            return Err(Error::BadRequest {
                message: "Unexpected field".to_string(),
            });
        }

        if placed.len() == max_files {
            warn!(max_files = max_files, "Upload exceeded file count limit");
            return Err(Error::BadRequest {
                message: overflow_message.to_string(),
            });
        }

        let content = field.map_err(std::io::Error::other).boxed();
        let stored = state.storage.place(&original_name, content).await.map_err(storage_error)?;
        placed.push(stored);
    }

    Ok(())
}

/// Best-effort removal of files stored by a request that is about to fail
async fn discard(state: &AppState, placed: &[StoredFile]) {
    for file in placed {
        if let Err(e) = state.storage.remove(&file.stored_name).await {
            warn!(stored_name = %file.stored_name, error = %e, "Failed to remove file from failed upload");
        }
    }
}

fn multipart_error(e: &MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: "Upload exceeds the maximum allowed request size".to_string(),
        }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}

/// Stream failures that originate in the multipart parser are reported the same way as parser
/// errors between fields; everything else is a storage problem.
fn storage_error(e: StorageError) -> Error {
    if let StorageError::Stream(io) = &e
        && let Some(multipart) = io.get_ref().and_then(|inner| inner.downcast_ref::<MultipartError>())
    {
        return multipart_error(multipart);
    }
    Error::Storage(e)
}
