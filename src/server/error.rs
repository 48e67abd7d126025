use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Request-scoped failures of the analysis endpoint. Client-input problems map
/// to 400, everything unexpected to 500; no error is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No photo provided")]
    MissingPhoto,
    #[error("No photo selected")]
    EmptyPhoto,
    #[error("Invalid image format or corrupted file")]
    InvalidImage(#[source] anyhow::Error),
    #[error("No pose detected in image. Make sure the person is clearly visible and facing the camera.")]
    NoPoseDetected,
    #[error("Malformed multipart request")]
    BadMultipart(#[from] MultipartError),
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("analysis request failed: {self}");
        }

        (
            status,
            Json(ErrorBody {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
