//! Seed account configuration.

use serde::{Deserialize, Serialize};

/// Account created at startup when no user with this email exists.
///
/// Invitations can only be issued by an authenticated user, so a fresh
/// deployment needs one account that does not go through the invitation
/// gate.
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plain-text password; hashed before storage.
    pub password: String,
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
