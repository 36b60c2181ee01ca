use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    certificate::CertificateRequest, error::AppError, state, verify::VerificationResult,
};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyRequest {
    pub username: String,
    pub submission_id: String,
}

pub async fn verify_handler(
    State(state): State<Arc<state::State>>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, AppError> {
    for (field, value) in [
        ("username", &payload.username),
        ("submissionId", &payload.submission_id),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "missing required field '{field}'"
            )));
        }
    }

    let result = state
        .verifier
        .verify(payload.username.trim(), payload.submission_id.trim())
        .await?;

    Ok(Json(result))
}

pub async fn certificate_handler(
    State(state): State<Arc<state::State>>,
    Json(request): Json<CertificateRequest>,
) -> Result<Response, AppError> {
    certificate_response(&state, &request)
}

/// Same document via `GET /certificate?...`, kept for plain download links.
pub async fn certificate_download_handler(
    State(state): State<Arc<state::State>>,
    Query(request): Query<CertificateRequest>,
) -> Result<Response, AppError> {
    certificate_response(&state, &request)
}

fn certificate_response(
    state: &state::State,
    request: &CertificateRequest,
) -> Result<Response, AppError> {
    let bytes = state.renderer.render(request)?;

    let filename = format!("certificate_{}.pdf", request.submission_id.trim());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}
