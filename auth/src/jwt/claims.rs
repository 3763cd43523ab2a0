use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Coarse authorization role carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Verified token payload.
///
/// Field names are part of the wire format: `user_id` and `role` plus the
/// registered `iat`, `nbf` and `exp` claims (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier (string form of the user id)
    pub user_id: String,

    /// Role of the subject at issue time
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user, valid from `issued_at` for `lifetime`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `role` - Role of the user
    /// * `issued_at` - Issue instant, also used as not-before
    /// * `lifetime` - Validity window length
    ///
    /// # Errors
    /// * `EncodingFailed` - The expiry instant is not representable
    pub fn for_user(
        user_id: impl ToString,
        role: Role,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        let iat = issued_at.timestamp();
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or_else(|| JwtError::EncodingFailed("token expiry out of range".to_string()))?;

        Ok(Self {
            user_id: user_id.to_string(),
            role,
            iat,
            nbf: iat,
            exp: expires_at.timestamp(),
        })
    }

    /// Check if the token has not reached its not-before instant.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.nbf
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Check if `current_timestamp` lies within `[nbf, exp]`.
    pub fn is_active(&self, current_timestamp: i64) -> bool {
        !self.is_premature(current_timestamp) && !self.is_expired(current_timestamp)
    }
}
