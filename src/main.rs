//! Warden server
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use warden_api::{AppState, build_router};
use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_core::traits::{Clock, SystemClock};
use warden_service::MailOutbox;
use warden_worker::{CronScheduler, MailDeliveryWorker, build_mailer};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `WARDEN_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Storage ──────────────────────────────────────────
    let (repos, db_pool) = warden_database::open_repositories(&config.database).await?;

    // ── Step 2: Mail outbox and delivery worker ──────────────────
    let (outbox, inbox) = MailOutbox::channel(config.mail.outbox_capacity);
    let mailer = build_mailer(&config.mail)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let delivery = MailDeliveryWorker::new(mailer);
    let delivery_cancel = shutdown_rx.clone();
    let delivery_handle = tokio::spawn(async move {
        delivery.run(inbox, delivery_cancel).await;
    });

    // ── Step 3: Services ─────────────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let bootstrap = config.bootstrap.clone();
    let purge_cron = config.session.purge_cron.clone();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app_state = AppState::build(config, repos, outbox, clock)?;

    if let Some(bootstrap) = bootstrap {
        match app_state.account_service.seed(&bootstrap).await? {
            Some(user) => tracing::info!(user_id = %user.id, "Bootstrap account created"),
            None => tracing::debug!("Bootstrap account already present"),
        }
    }

    // ── Step 4: Session purge schedule ───────────────────────────
    let mut scheduler = CronScheduler::new().await?;
    scheduler
        .register_session_purge(Arc::clone(&app_state.session_cleanup), &purge_cron)
        .await?;
    scheduler.start().await?;

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Warden server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 7: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background tasks to complete...");

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }
    let _ = tokio::time::timeout(Duration::from_secs(30), delivery_handle).await;

    if let Some(db_pool) = db_pool {
        db_pool.close().await;
    }

    tracing::info!("Warden server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
