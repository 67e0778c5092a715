use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppError;
use crate::reset::{RequestOutcome, Resolution};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

pub async fn request_reset(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, AppError> {
    // Unknown addresses get the same 204 as known ones
    match state.coordinator.request_reset(&req.email).await? {
        RequestOutcome::Sent => Ok(StatusCode::NO_CONTENT),
        RequestOutcome::InvalidInput(msg) => Err(AppError::Forbidden(msg)),
    }
}

pub async fn check_token(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<StatusCode, AppError> {
    let resolution = state.coordinator.resolve_token(&token).await?;
    status_for(resolution)
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let resolution = state
        .coordinator
        .complete_reset(&token, &req.password)
        .await?;
    status_for(resolution)
}

fn status_for(resolution: Resolution) -> Result<StatusCode, AppError> {
    match resolution {
        Resolution::Valid(_) | Resolution::Success => Ok(StatusCode::NO_CONTENT),
        Resolution::Expired => Err(AppError::Forbidden("link expired".to_string())),
        Resolution::NotFound => Err(AppError::NotFound("Not found".to_string())),
        Resolution::InvalidInput(msg) => Err(AppError::Forbidden(msg)),
    }
}
