//! HTTP layer: route handlers, response models and HTML views.
//!
//! - **[`handlers`]**: Axum route handlers for the form page and the upload endpoints
//! - **[`models`]**: Data rendered into responses
//! - **[`views`]**: minijinja templates for every HTML body the server produces
//!
//! # Routes
//!
//! - `GET /` - upload forms
//! - `POST /upload` - single image (`image` field)
//! - `POST /gallery` - up to ten images (`gallery` field)
//! - `GET /uploads/{stored_name}` - stored files, served by `tower_http::services::ServeDir`

pub mod handlers;
pub mod models;
pub mod views;
