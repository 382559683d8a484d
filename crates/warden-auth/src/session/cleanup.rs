//! Expired session cleanup.

use std::sync::Arc;

use tracing::{debug, info};

use warden_core::result::AppResult;
use warden_core::traits::Clock;

use super::store::SessionStore;

/// Deletes sessions past their expiry, revoked or not.
///
/// Rows are kept until expiry so that reuse of a rotated token is still
/// recognizable; after that a replay classifies as unknown anyway.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    /// Session store to sweep.
    session_store: Arc<SessionStore>,
    /// Time source for the expiry cut-off.
    clock: Arc<dyn Clock>,
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(session_store: Arc<SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session_store,
            clock,
        }
    }

    /// Runs one sweep. Returns the number of sessions deleted.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let purged = self.session_store.purge_expired(self.clock.now()).await?;

        if purged == 0 {
            debug!("No expired sessions to purge");
        } else {
            info!(purged, "Expired sessions purged");
        }

        Ok(purged)
    }
}
