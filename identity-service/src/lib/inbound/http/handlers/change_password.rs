use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::NewPassword;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let new_password = NewPassword::new(req.new_password).map_err(UserError::from)?;

    state
        .user_service
        .change_password(&user.user_id, &req.old_password, new_password)
        .await
        .map_err(|e| match e {
            UserError::InvalidCredentials => {
                ApiError::Unauthorized("Incorrect old password".to_string())
            }
            _ => ApiError::from(e),
        })
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Password changed")))
}
