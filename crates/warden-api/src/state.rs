//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_auth::{
    JwtDecoder, JwtEncoder, PasswordHasher, RotationProtocol, SessionCleanup, SessionManager,
    SessionStore,
};
use warden_core::config::AppConfig;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_database::Repositories;
use warden_service::{AccountService, InvitationService, MailOutbox};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Login, refresh, logout, and access token verification
    pub session_manager: Arc<SessionManager>,
    /// Expired-session sweep, driven by the worker scheduler
    pub session_cleanup: Arc<SessionCleanup>,

    // ── Services ─────────────────────────────────────────────
    /// Invitation lifecycle
    pub invitation_service: Arc<InvitationService>,
    /// Registration and profile lookup
    pub account_service: Arc<AccountService>,
}

impl AppState {
    /// Wires every component from configuration, repositories, the mail
    /// outbox, and a clock.
    ///
    /// Fails with a configuration error when the signing key is missing.
    pub fn build(
        config: AppConfig,
        repos: Repositories,
        outbox: MailOutbox,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new());
        let encoder = Arc::new(JwtEncoder::new(&config.auth, Arc::clone(&clock))?);
        let decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&clock))?);

        let session_store = Arc::new(SessionStore::new(repos.sessions, &config.session));
        let rotation = Arc::new(RotationProtocol::new(
            Arc::clone(&session_store),
            repos.audit,
            encoder,
            Arc::clone(&clock),
            &config.auth,
        ));
        let session_manager = Arc::new(SessionManager::new(
            Arc::clone(&repos.users),
            Arc::clone(&hasher),
            Arc::clone(&session_store),
            rotation,
            decoder,
            Arc::clone(&clock),
        ));
        let session_cleanup = Arc::new(SessionCleanup::new(session_store, Arc::clone(&clock)));

        let invitation_service = Arc::new(InvitationService::new(
            repos.invitations,
            outbox,
            Arc::clone(&clock),
            &config.invitation,
            &config.mail,
        ));
        let account_service = Arc::new(AccountService::new(
            repos.users,
            Arc::clone(&invitation_service),
            hasher,
            clock,
        ));

        Ok(Self {
            config: Arc::new(config),
            session_manager,
            session_cleanup,
            invitation_service,
            account_service,
        })
    }
}
