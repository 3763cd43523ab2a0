//! Credential and token primitives for the identity service.
//!
//! Two building blocks live here, plus a coordinator that bundles them:
//! - [`PasswordHasher`]: salted Argon2id digests in PHC string form
//! - [`JwtHandler`]: HS256 access tokens carrying a user id and a [`Role`]
//! - [`Authenticator`]: one hasher and one token handler sharing a secret
//!
//! Nothing in this crate performs I/O. The signing secret is injected at
//! construction so that independent instances never share key material.
//!
//! # Examples
//!
//! Storing and checking a credential:
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &digest));
//! assert!(!hasher.verify("other_password", &digest));
//! ```
//!
//! Issuing an access token and reading it back:
//! ```
//! use auth::{JwtHandler, Role};
//!
//! let tokens = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = tokens.issue("user123", Role::Admin).unwrap();
//! let claims = tokens.validate(&token).unwrap();
//! assert_eq!(claims.user_id, "user123");
//! assert_eq!(claims.role, Role::Admin);
//! ```
//!
//! Login against a stored digest:
//! ```
//! use auth::{AuthenticationError, Authenticator, Role};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//! let digest = auth.hash_password("password123").unwrap();
//!
//! let granted = auth.authenticate("password123", &digest, "user123", Role::User).unwrap();
//! assert_eq!(auth.validate_token(&granted.access_token).unwrap().role, Role::User);
//!
//! let denied = auth.authenticate("wrong", &digest, "user123", Role::User);
//! assert!(matches!(denied, Err(AuthenticationError::InvalidCredentials)));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::{AuthenticationError, AuthenticationResult, Authenticator};
pub use jwt::{Claims, JwtError, JwtHandler, Role};
pub use password::{HashCost, PasswordError, PasswordHasher};
