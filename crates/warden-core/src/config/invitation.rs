//! Invitation lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Invitation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationConfig {
    /// Lifetime of an invitation token in hours, from issuance or resend.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    /// Number of random bytes in an invitation token.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            token_bytes: default_token_bytes(),
        }
    }
}

fn default_ttl_hours() -> u64 {
    48
}

fn default_token_bytes() -> usize {
    32
}
