use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Role;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::NewPassword;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::PublicUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn require_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    /// Email lookup first, username only when the email lookup finds nothing.
    async fn find_login_candidate(&self, identifier: &str) -> Result<Option<User>, UserError> {
        if let Ok(email) = EmailAddress::new(identifier.to_string()) {
            if let Some(user) = self.repository.find_by_email(&email).await? {
                return Ok(Some(user));
            }
        }

        match Username::new(identifier.to_string()) {
            Ok(username) => self.repository.find_by_username(&username).await,
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<PublicUser, UserError> {
        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            return Err(UserError::UserAlreadyExists);
        }

        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(UserError::UserAlreadyExists);
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.as_str())?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;

        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user.to_public())
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, UserError> {
        let Some(user) = self.find_login_candidate(identifier).await? else {
            self.authenticator.reject_unknown(password);
            tracing::info!("Login rejected");
            return Err(UserError::InvalidCredentials);
        };

        let result = self
            .authenticator
            .authenticate(password, &user.password_hash, user.id, user.role)
            .map_err(|e| {
                tracing::info!("Login rejected");
                UserError::from(e)
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginOutcome {
            token: result.access_token,
            user: user.to_public(),
        })
    }

    async fn change_password(
        &self,
        id: &UserId,
        old_password: &str,
        new_password: NewPassword,
    ) -> Result<(), UserError> {
        let mut user = self.require_user(id).await?;

        if !self
            .authenticator
            .verify_password(old_password, &user.password_hash)
        {
            tracing::info!(user_id = %id, "Password change rejected");
            return Err(UserError::InvalidCredentials);
        }

        user.password_hash = self.authenticator.hash_password(new_password.as_str())?;
        user.updated_at = Utc::now();

        self.repository.update(user).await?;

        tracing::info!(user_id = %id, "Password changed");

        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<PublicUser, UserError> {
        self.require_user(id).await.map(|user| user.to_public())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<PublicUser, UserError> {
        let mut user = self.require_user(id).await?;

        if let Some(first_name) = command.first_name.filter(|name| !name.is_empty()) {
            user.first_name = first_name;
        }

        if let Some(last_name) = command.last_name.filter(|name| !name.is_empty()) {
            user.last_name = last_name;
        }

        user.updated_at = Utc::now();

        let updated_user = self.repository.update(user).await?;

        tracing::info!(user_id = %id, "Profile updated");

        Ok(updated_user.to_public())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.require_user(id).await?;
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }

    async fn list_users(&self, request: PageRequest) -> Result<UserPage, UserError> {
        let (users, total) = self
            .repository
            .list(request.offset(), request.limit())
            .await?;

        Ok(UserPage {
            users: users.iter().map(User::to_public).collect(),
            total,
            page: request.page,
            size: request.size,
            total_pages: request.total_pages(total),
        })
    }
}
