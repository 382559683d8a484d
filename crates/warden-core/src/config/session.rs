//! Session store configuration.

use serde::{Deserialize, Serialize};

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound for a single store call, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    /// Cron expression (with seconds) for the expired-session sweep.
    #[serde(default = "default_purge_cron")]
    pub purge_cron: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout(),
            purge_cron: default_purge_cron(),
        }
    }
}

fn default_store_timeout() -> u64 {
    5000
}

fn default_purge_cron() -> String {
    "0 */15 * * * *".to_string()
}
