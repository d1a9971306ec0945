use crate::storage::errors::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data, e.g. a missing or unexpected upload field
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// Request body exceeded the configured upload limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Storage layer error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Storage(storage_err) => match storage_err {
                StorageError::Stream(_) => StatusCode::BAD_REQUEST,
                StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking filesystem paths or other internals
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } | Error::PayloadTooLarge { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Storage(storage_err) => match storage_err {
                StorageError::Stream(_) => "Failed to read uploaded file".to_string(),
                StorageError::Io(_) => "Internal server error".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Internal { .. } | Error::Other(_) | Error::Storage(StorageError::Io(_)) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Storage(_) => {
                tracing::warn!("Storage error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::PayloadTooLarge { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
