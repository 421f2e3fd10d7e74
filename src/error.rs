//! Error types for document rendering and the HTTP surface

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF backend error: {0}")]
    Pdf(String),

    #[error("PDF post-processing error: {0}")]
    Lopdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown document kind: {0}")]
    UnknownKind(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::UnknownKind(kind) => (
                StatusCode::NOT_FOUND,
                format!("Unknown document kind: {}", kind),
            ),
            ApiError::Render(e) => {
                tracing::error!("Render error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render document".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
