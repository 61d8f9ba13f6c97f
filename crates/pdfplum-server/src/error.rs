//! Error handling for the API server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pdfplum::{PdfplumError, SourceError, StorageError};
use serde_json::json;
use thiserror::Error;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable template: {0}")]
    Unprocessable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pdfplum error: {0}")]
    Pdfplum(#[from] PdfplumError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SourceError> for ApiError {
    fn from(error: SourceError) -> Self {
        ApiError::Pdfplum(error.into())
    }
}

impl ApiError {
    pub fn bad_request(msg: &str) -> Self {
        Self::BadRequest(msg.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Config(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pdfplum(e) => match e {
                e if e.is_not_found() => StatusCode::NOT_FOUND,
                PdfplumError::Storage(StorageError::AccessDenied(_)) => StatusCode::FORBIDDEN,
                PdfplumError::Storage(StorageError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
                PdfplumError::Storage(_) => StatusCode::BAD_GATEWAY,
                PdfplumError::Source(_) => StatusCode::BAD_REQUEST,
                PdfplumError::Archive(_) | PdfplumError::Render { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PdfplumError::FileSystem(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            ApiError::Pdfplum(PdfplumError::FileSystem(_)) | ApiError::Io(_) => {
                "Internal server error".to_string()
            }
            ApiError::Config(_) => "Configuration error".to_string(),
            ApiError::Pdfplum(e) => e.user_message(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfplum::ArchiveError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(PdfplumError::from(StorageError::NotFound("t".into())));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let backend = ApiError::from(PdfplumError::from(StorageError::Backend("down".into())));
        assert_eq!(backend.status(), StatusCode::BAD_GATEWAY);

        let archive = ApiError::from(PdfplumError::from(ArchiveError::MissingIndex));
        assert_eq!(archive.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let source = ApiError::from(SourceError::EmptyPath);
        assert_eq!(source.status(), StatusCode::BAD_REQUEST);

        let io = ApiError::from(std::io::Error::other("disk full"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
