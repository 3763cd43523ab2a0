use auth::Role;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Echo the identity carried by a valid bearer token.
pub async fn validate_token(user: AuthenticatedUser) -> ApiSuccess<TokenStatusData> {
    ApiSuccess::new(
        StatusCode::OK,
        TokenStatusData {
            valid: true,
            user_id: user.user_id.to_string(),
            role: user.role,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatusData {
    pub valid: bool,
    pub user_id: String,
    pub role: Role,
}
