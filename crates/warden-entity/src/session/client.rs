//! Client descriptor attached to sessions.

use serde::{Deserialize, Serialize};

/// Describes the client that presented a credential.
///
/// Diagnostic only: nothing compares client tags when deciding whether a
/// session may be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTag {
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Source address as seen by the server.
    pub ip_address: Option<String>,
}

impl ClientTag {
    /// Creates a tag from optional header values.
    pub fn new(user_agent: Option<String>, ip_address: Option<String>) -> Self {
        Self {
            user_agent,
            ip_address,
        }
    }
}

impl std::fmt::Display for ClientTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.ip_address.as_deref().unwrap_or("unknown"),
            self.user_agent.as_deref().unwrap_or("unknown")
        )
    }
}
