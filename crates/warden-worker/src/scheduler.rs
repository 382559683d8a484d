//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use warden_auth::SessionCleanup;
use warden_core::error::AppError;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Expired-session purge on the given cron expression (with seconds).
    pub async fn register_session_purge(
        &self,
        cleanup: Arc<SessionCleanup>,
        expression: &str,
    ) -> Result<(), AppError> {
        let job = CronJob::new_async(expression, move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            Box::pin(async move {
                tracing::debug!("Running scheduled session purge");
                if let Err(e) = cleanup.run_cleanup().await {
                    tracing::error!(error = %e, "Scheduled session purge failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid session purge schedule '{expression}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_purge schedule: {e}"))
        })?;

        tracing::info!(schedule = expression, "Registered: session_purge");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use warden_auth::SessionStore;
    use warden_core::config::SessionConfig;
    use warden_core::traits::ManualClock;
    use warden_database::memory::MemorySessionRepository;

    use super::*;

    fn cleanup() -> Arc<SessionCleanup> {
        let store = Arc::new(SessionStore::new(
            Arc::new(MemorySessionRepository::new()),
            &SessionConfig::default(),
        ));
        Arc::new(SessionCleanup::new(
            store,
            Arc::new(ManualClock::new(Utc::now())),
        ))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn registers_default_purge_schedule() {
        let scheduler = CronScheduler::new().await.unwrap();
        scheduler
            .register_session_purge(cleanup(), &SessionConfig::default().purge_cron)
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejects_malformed_schedule() {
        let scheduler = CronScheduler::new().await.unwrap();
        let err = scheduler
            .register_session_purge(cleanup(), "every fifteen minutes")
            .await
            .unwrap_err();
        assert_eq!(err.kind, warden_core::ErrorKind::Configuration);
    }
}
