use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("reviewer '{0}' not found")]
    ReviewerNotFound(String),

    #[error("submission {0} has no review assignments")]
    NoAssignment(String),

    #[error("submission {0} not found")]
    SubmissionNotFound(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("certificate rendering failed: {0}")]
    Render(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::ReviewerNotFound { .. } | AppError::NoAssignment { .. } => {
                StatusCode::FORBIDDEN
            }
            AppError::SubmissionNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Render { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
