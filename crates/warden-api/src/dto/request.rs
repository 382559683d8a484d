//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use warden_service::NewAccount;

/// Login request body.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Registration request body.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Invited email address.
    pub email: String,
    /// Password, 6 to 25 characters.
    pub password: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}

/// Create invitation request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    /// Invitee address.
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

/// Query string of the accept link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcceptInvitationQuery {
    /// Invitation token.
    pub token: Option<String>,
}
