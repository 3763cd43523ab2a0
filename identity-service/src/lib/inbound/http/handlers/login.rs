use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::user::models::LoginOutcome;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiSuccess<LoginOutcome>, ApiError> {
    state
        .user_service
        .login(&body.username_or_email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|outcome| ApiSuccess::new(StatusCode::OK, outcome))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username_or_email: String,
    password: String,
}
