use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Role;
use super::errors::JwtError;

/// JWT token handler for issuing and validating tokens.
///
/// Signs with HS256 (HMAC with SHA-256) under a single shared secret and
/// accepts nothing else.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    lifetime: Duration,
}

impl JwtHandler {
    pub const DEFAULT_LIFETIME_HOURS: i64 = 24;
    pub const MAX_LIFETIME_HOURS: i64 = 24 * 365;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 and a 24 hour token lifetime
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        let algorithm = Algorithm::HS256;

        // Temporal checks run against an explicit clock in `validate_at`
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
            lifetime: Duration::hours(Self::DEFAULT_LIFETIME_HOURS),
        }
    }

    /// Override the token lifetime.
    ///
    /// # Errors
    /// * `InvalidLifetime` - `hours` is not within `1..=MAX_LIFETIME_HOURS`
    pub fn with_lifetime_hours(mut self, hours: i64) -> Result<Self, JwtError> {
        if !(1..=Self::MAX_LIFETIME_HOURS).contains(&hours) {
            return Err(JwtError::InvalidLifetime(hours));
        }
        self.lifetime = Duration::try_hours(hours).ok_or(JwtError::InvalidLifetime(hours))?;
        Ok(self)
    }

    /// Token lifetime applied at issue time.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for a subject, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: impl ToString, role: Role) -> Result<String, JwtError> {
        self.issue_at(subject, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed or the expiry overflows
    pub fn issue_at(
        &self,
        subject: impl ToString,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_user(subject, role, now, self.lifetime)?;
        self.encode(&claims)
    }

    /// Sign arbitrary claims with the configured algorithm.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, forged, uses another algorithm,
    ///   is not yet valid or has expired
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// The declared algorithm is checked before any signature work is done.
    ///
    /// # Errors
    /// * `InvalidToken` - Any structural, signature, algorithm or temporal failure
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let header = decode_header(token).map_err(|_| JwtError::InvalidToken)?;
        if header.alg != self.algorithm {
            return Err(JwtError::InvalidToken);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| JwtError::InvalidToken)?;

        if !token_data.claims.is_active(now.timestamp()) {
            return Err(JwtError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde_json::json;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[test]
    fn test_issue_and_validate() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .issue("user123", Role::Admin)
            .expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let claims = handler.validate(&token).expect("Failed to validate token");
        assert_eq!(claims.user_id, "user123");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn test_payload_field_names() {
        let handler = JwtHandler::new(SECRET);
        let token = handler.issue("user123", Role::User).unwrap();

        let payload = token.split('.').nth(1).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(payload).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["user_id"], "user123");
        assert_eq!(value["role"], "user");
        assert!(value["iat"].is_i64());
        assert!(value["nbf"].is_i64());
        assert!(value["exp"].is_i64());
    }

    #[test]
    fn test_validate_invalid_token() {
        let handler = JwtHandler::new(SECRET);

        assert_eq!(
            handler.validate("invalid.token.here"),
            Err(JwtError::InvalidToken)
        );
        assert_eq!(handler.validate(""), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1.issue("user123", Role::User).unwrap();

        assert_eq!(handler2.validate(&token), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_rejects_expired_token() {
        let handler = JwtHandler::new(SECRET);
        let issued_at = Utc::now() - Duration::hours(25);

        let token = handler.issue_at("user123", Role::User, issued_at).unwrap();

        assert_eq!(handler.validate(&token), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_rejects_token_before_not_before() {
        let handler = JwtHandler::new(SECRET);
        let issued_at = Utc::now() + Duration::hours(1);

        let token = handler.issue_at("user123", Role::User, issued_at).unwrap();

        assert_eq!(handler.validate(&token), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validity_boundaries() {
        let handler = JwtHandler::new(SECRET);
        let issued_at = Utc::now();
        let token = handler.issue_at("user123", Role::User, issued_at).unwrap();
        let expiry = issued_at + Duration::hours(24);

        assert!(handler.validate_at(&token, issued_at).is_ok());
        assert!(handler.validate_at(&token, expiry).is_ok());
        assert!(handler
            .validate_at(&token, expiry + Duration::seconds(1))
            .is_err());
        assert!(handler
            .validate_at(&token, issued_at - Duration::seconds(1))
            .is_err());
    }

    #[test]
    fn test_validate_rejects_flipped_signature_bit() {
        let handler = JwtHandler::new(SECRET);
        let token = handler.issue("user123", Role::User).unwrap();

        let (signed, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
        bytes[0] ^= 0x01;
        let tampered = format!("{}.{}", signed, URL_SAFE_NO_PAD.encode(bytes));

        assert_eq!(handler.validate(&tampered), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_rejects_tampered_payload() {
        let handler = JwtHandler::new(SECRET);
        let token = handler.issue("user123", Role::User).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let claims = handler.validate(&token).unwrap();
        let forged = json!({
            "user_id": claims.user_id,
            "role": "admin",
            "iat": claims.iat,
            "nbf": claims.nbf,
            "exp": claims.exp,
        });
        let forged_payload = URL_SAFE_NO_PAD.encode(forged.to_string());
        let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(handler.validate(&tampered), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_rejects_other_hmac_algorithm() {
        let handler = JwtHandler::new(SECRET);
        let claims =
            Claims::for_user("user123", Role::User, Utc::now(), Duration::hours(24)).unwrap();

        // Same secret, same claims, different algorithm label
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(handler.validate(&token), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_rejects_unsigned_token() {
        let handler = JwtHandler::new(SECRET);
        let claims =
            Claims::for_user("user123", Role::Admin, Utc::now(), Duration::hours(24)).unwrap();

        let header = URL_SAFE_NO_PAD.encode(json!({"alg": "none", "typ": "JWT"}).to_string());
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let token = format!("{}.{}.", header, payload);

        assert_eq!(handler.validate(&token), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_rejects_missing_claims() {
        let handler = JwtHandler::new(SECRET);

        #[derive(serde::Serialize)]
        struct Partial {
            user_id: String,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial {
                user_id: "user123".to_string(),
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(handler.validate(&token), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_custom_lifetime() {
        let handler = JwtHandler::new(SECRET).with_lifetime_hours(1).unwrap();
        let token = handler.issue("user123", Role::User).unwrap();

        let claims = handler.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert_eq!(handler.lifetime(), Duration::hours(1));
    }

    #[test]
    fn test_lifetime_out_of_range() {
        let out_of_range = [
            0,
            -1,
            JwtHandler::MAX_LIFETIME_HOURS + 1,
            1_000_000_000_000,
            i64::MAX / 2,
        ];

        for hours in out_of_range {
            assert_eq!(
                JwtHandler::new(SECRET).with_lifetime_hours(hours).err(),
                Some(JwtError::InvalidLifetime(hours))
            );
        }
    }

    #[test]
    fn test_longest_lifetime_issues() {
        let handler = JwtHandler::new(SECRET)
            .with_lifetime_hours(JwtHandler::MAX_LIFETIME_HOURS)
            .unwrap();
        let token = handler.issue("user123", Role::User).unwrap();

        let claims = handler.validate(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, JwtHandler::MAX_LIFETIME_HOURS * 60 * 60);
    }
}
