use auth::Authenticator;
use auth::Role;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated identity in request extensions.
///
/// Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

/// Access guard rejections.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthorized => ApiError::Unauthorized(err.to_string()),
            GuardError::Forbidden => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Resolve the caller's identity from an `Authorization: Bearer <token>` header.
///
/// Every failure, from a missing header to a garbage subject inside a
/// correctly signed token, is reported as `Unauthorized`.
pub fn authenticate_headers(
    headers: &HeaderMap,
    authenticator: &Authenticator,
) -> Result<AuthenticatedUser, GuardError> {
    let token = extract_bearer_token(headers)?;

    let claims = authenticator.validate_token(token).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        GuardError::Unauthorized
    })?;

    let user_id = UserId::from_string(&claims.user_id).map_err(|e| {
        tracing::warn!("Failed to parse user ID from token: {}", e);
        GuardError::Unauthorized
    })?;

    Ok(AuthenticatedUser {
        user_id,
        role: claims.role,
    })
}

/// Check that an authenticated caller holds `role`.
///
/// No identity at all is `Unauthorized`; the wrong role is `Forbidden`.
pub fn require_role(
    context: Option<&AuthenticatedUser>,
    role: Role,
) -> Result<(), GuardError> {
    let user = context.ok_or(GuardError::Unauthorized)?;

    if user.role != role {
        tracing::warn!(
            user_id = %user.user_id,
            role = %user.role,
            required = %role,
            "Role check failed"
        );
        return Err(GuardError::Forbidden);
    }

    Ok(())
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, GuardError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or_else(|| {
        tracing::debug!("Missing Authorization header");
        GuardError::Unauthorized
    })?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| GuardError::Unauthorized)?;

    match auth_str.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token),
        _ => {
            tracing::debug!("Malformed Authorization header");
            Err(GuardError::Unauthorized)
        }
    }
}

/// Middleware that validates JWT tokens and adds user info to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, GuardError> {
    let user = authenticate_headers(req.headers(), &state.authenticator)?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Middleware that admits only callers with the `admin` role.
///
/// Must run after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, GuardError> {
    require_role(req.extensions().get::<AuthenticatedUser>(), Role::Admin)?;

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GuardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(GuardError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use auth::JwtHandler;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn issue(subject: impl ToString, role: Role) -> String {
        JwtHandler::new(SECRET).issue(subject, role).unwrap()
    }

    #[test]
    fn test_authenticate_valid_token() {
        let authenticator = Authenticator::new(SECRET);
        let user_id = UserId::new();
        let token = issue(user_id, Role::Admin);

        let user = authenticate_headers(&headers_with(&format!("Bearer {}", token)), &authenticator)
            .expect("Authentication failed");

        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_authenticate_missing_header() {
        let authenticator = Authenticator::new(SECRET);

        assert_eq!(
            authenticate_headers(&HeaderMap::new(), &authenticator),
            Err(GuardError::Unauthorized)
        );
    }

    #[test]
    fn test_authenticate_malformed_header() {
        let authenticator = Authenticator::new(SECRET);
        let token = issue(UserId::new(), Role::User);

        for value in [
            token.clone(),
            format!("Basic {}", token),
            format!("bearer {}", token),
            format!("Bearer  {}", token),
            "Bearer".to_string(),
            "Bearer ".to_string(),
        ] {
            assert_eq!(
                authenticate_headers(&headers_with(&value), &authenticator),
                Err(GuardError::Unauthorized),
                "header {:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_authenticate_rejects_foreign_signature() {
        let authenticator = Authenticator::new(SECRET);
        let token = JwtHandler::new(b"another-secret-key-at-least-32-bytes-long")
            .issue(UserId::new(), Role::Admin)
            .unwrap();

        assert_eq!(
            authenticate_headers(&headers_with(&format!("Bearer {}", token)), &authenticator),
            Err(GuardError::Unauthorized)
        );
    }

    #[test]
    fn test_authenticate_rejects_expired_token() {
        let authenticator = Authenticator::new(SECRET);
        let token = JwtHandler::new(SECRET)
            .issue_at(UserId::new(), Role::User, Utc::now() - Duration::hours(48))
            .unwrap();

        assert_eq!(
            authenticate_headers(&headers_with(&format!("Bearer {}", token)), &authenticator),
            Err(GuardError::Unauthorized)
        );
    }

    #[test]
    fn test_authenticate_rejects_malformed_subject() {
        let authenticator = Authenticator::new(SECRET);
        let token = issue("not-a-uuid", Role::Admin);

        assert_eq!(
            authenticate_headers(&headers_with(&format!("Bearer {}", token)), &authenticator),
            Err(GuardError::Unauthorized)
        );
    }

    #[test]
    fn test_require_role() {
        let user = AuthenticatedUser {
            user_id: UserId::new(),
            role: Role::User,
        };
        let admin = AuthenticatedUser {
            user_id: UserId::new(),
            role: Role::Admin,
        };

        assert_eq!(
            require_role(Some(&user), Role::Admin),
            Err(GuardError::Forbidden)
        );
        assert_eq!(require_role(Some(&admin), Role::Admin), Ok(()));
        assert_eq!(require_role(Some(&user), Role::User), Ok(()));
        assert_eq!(require_role(None, Role::Admin), Err(GuardError::Unauthorized));
    }
}
