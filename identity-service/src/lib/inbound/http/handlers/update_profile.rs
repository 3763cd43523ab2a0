use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::UpdateProfileCommand;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::NameError;

/// HTTP request body for updating display names (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl TryFrom<UpdateProfileRequest> for UpdateProfileCommand {
    type Error = NameError;

    fn try_from(req: UpdateProfileRequest) -> Result<Self, Self::Error> {
        let validate = |name: Option<String>| {
            name.map(PersonName::new)
                .transpose()
                .map(|name| name.map(String::from))
        };

        Ok(Self {
            first_name: validate(req.first_name)?,
            last_name: validate(req.last_name)?,
        })
    }
}

impl From<NameError> for ApiError {
    fn from(err: NameError) -> Self {
        ApiError::UnprocessableEntity(format!("Invalid name: {}", err))
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<ApiSuccess<PublicUser>, ApiError> {
    let command = UpdateProfileCommand::try_from(req)?;

    state
        .user_service
        .update_profile(&user.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile))
}
