use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorBody;

pub const DESCRIPTION_REQUIRED: &str = "Description is required.";
pub const UPLOAD_REQUIRED: &str = "Character image upload is required.";
pub const URL_REQUIRED: &str = "Character image URL is required.";
pub const UPLOAD_TOO_LARGE: &str = "Upload exceeds the size limit.";

/// Everything the generate endpoint can reject; all of it is the caller's fault.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            // 400 for broken bodies, 413 when the upload limit was hit
            Self::Multipart { status, .. } => *status,
        }
    }

    fn multipart(status: StatusCode, detail: String) -> Self {
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            UPLOAD_TOO_LARGE.to_string()
        } else {
            format!("Malformed multipart body: {detail}")
        };
        Self::Multipart { status, message }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::multipart(e.status(), e.body_text())
    }
}

impl From<axum::extract::multipart::MultipartRejection> for ApiError {
    fn from(e: axum::extract::multipart::MultipartRejection) -> Self {
        Self::multipart(e.status(), e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(%status, error = %self, "rejecting generation request");
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
