use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .user_service
        .delete_user(&user.user_id)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Account deleted")))
}
