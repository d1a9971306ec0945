//! HTTP request handlers.
//!
//! - [`pages`]: the upload form page and the not-found fallback
//! - [`uploads`]: single and gallery uploads
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to a status code and a plain-text
//! body. Missing or unexpected upload fields are 400s; storage failures are logged and become 500.

pub mod pages;
pub mod uploads;
