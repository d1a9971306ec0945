//! HTTP handlers for the HTML form page and unmatched routes.

use axum::{extract::State, http::Uri, response::Html};
use tracing::{debug, instrument};

use crate::AppState;
use crate::errors::{Error, Result};

/// Serve the landing page with the single and gallery upload forms
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let page = state
        .views
        .index(state.config.uploads.max_gallery_files)
        .map_err(|e| Error::Other(e.into()))?;
    Ok(Html(page))
}

/// Fallback for routes that match nothing
pub async fn not_found(uri: Uri) -> Error {
    debug!("No route for: {}", uri.path());
    Error::NotFound {
        resource: "Page".to_string(),
        id: uri.path().to_string(),
    }
}
