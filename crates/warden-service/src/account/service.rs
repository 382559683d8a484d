//! Account service.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use warden_auth::{PasswordHasher, normalize_email};
use warden_core::config::BootstrapConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_database::repositories::UserRepository;
use warden_entity::user::{CreateUser, User};

use crate::invitation::InvitationService;

/// Registration input.
#[derive(Clone, Deserialize, Validate)]
pub struct NewAccount {
    /// Login name.
    #[validate(length(min = 1, max = 100, message = "Username must be 1 to 100 characters"))]
    pub username: String,
    /// Address the invitation was sent to.
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    /// Plain-text password.
    #[validate(length(min = 6, max = 25, message = "Password must be 6 to 25 characters"))]
    pub password: String,
}

impl NewAccount {
    /// Strips surrounding whitespace from the username and email so
    /// validation sees what will be stored. The password is kept as typed.
    fn trimmed(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Creates and looks up accounts.
#[derive(Debug, Clone)]
pub struct AccountService {
    /// User repository.
    users: Arc<dyn UserRepository>,
    /// Invitation service, for the acceptance gate.
    invitations: Arc<InvitationService>,
    /// Password hasher (Argon2).
    hasher: Arc<PasswordHasher>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        invitations: Arc<InvitationService>,
        hasher: Arc<PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            invitations,
            hasher,
            clock,
        }
    }

    /// Registers an account for an email whose invitation was accepted.
    pub async fn register(&self, account: NewAccount) -> AppResult<User> {
        let account = account.trimmed();
        account
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid registration: {e}")))?;

        let email = normalize_email(&account.email);
        let username = account.username;

        self.invitations.ensure_accepted(&email).await?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::validation("Email is already taken"));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::validation("Username is already taken"));
        }

        let password_hash = self.hasher.hash_password(&account.password)?;
        let user = self
            .users
            .create(
                &CreateUser {
                    username,
                    email,
                    password_hash,
                },
                self.clock.now(),
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Creates the configured seed account unless its email is taken.
    /// Skips the invitation gate. Returns the user when one was created.
    pub async fn seed(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<User>> {
        let account = NewAccount {
            username: bootstrap.username.clone(),
            email: bootstrap.email.clone(),
            password: bootstrap.password.clone(),
        }
        .trimmed();
        account
            .validate()
            .map_err(|e| AppError::configuration(format!("Invalid bootstrap account: {e}")))?;

        let email = normalize_email(&account.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(None);
        }

        let user = self
            .users
            .create(
                &CreateUser {
                    username: account.username,
                    email,
                    password_hash: self.hasher.hash_password(&account.password)?,
                },
                self.clock.now(),
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "Seed account created");
        Ok(Some(user))
    }

    /// Looks up the account behind an authenticated principal.
    pub async fn profile(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
