/// Public library interface for the habit tracker service
///
/// This module exports the server implementation and the public types used
/// by the binary and by tests.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;

pub mod actions;
pub mod config;
pub mod domain;
pub mod http;
pub mod scheduler;
pub mod storage;

// Re-export the types most callers need
pub use config::ServerConfig;
pub use domain::*;
pub use scheduler::{CronSchedule, ScheduleError};
pub use storage::{HabitStorage, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] scheduler::ScheduleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The habit tracker HTTP server
///
/// Owns the storage client and configuration. The router and the daily
/// reset task both get a handle to the same storage.
pub struct HabitTrackerServer {
    storage: Arc<SqliteStorage>,
    config: ServerConfig,
    schedule: CronSchedule,
}

impl HabitTrackerServer {
    /// Open (or create) the database named in `config` and prepare the server
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        if let Some(parent) = config.database.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let storage = SqliteStorage::new(config.database.clone())?;
        Self::with_storage(storage, config)
    }

    /// Build a server around an already opened storage
    pub fn with_storage(storage: SqliteStorage, config: ServerConfig) -> Result<Self, ServerError> {
        let schedule = config.reset_schedule()?;

        Ok(Self {
            storage: Arc::new(storage),
            config,
            schedule,
        })
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// The HTTP router backed by this server's storage
    pub fn router(&self) -> axum::Router {
        http::router(http::AppState::new(Arc::clone(&self.storage)))
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_address()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `shutdown` completes
    ///
    /// The daily reset task runs alongside the HTTP server and is stopped
    /// once the server has drained.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let habits = self.storage.list_habits()?;
        tracing::info!("Found {} existing habits", habits.len());

        let (stop_tx, stop_rx) = watch::channel(false);
        let reset_task = tokio::spawn(scheduler::run_reset_loop(
            Arc::clone(&self.storage),
            self.schedule.clone(),
            stop_rx,
        ));

        let app = self.router();
        tracing::info!("Habit tracker listening on http://{}", listener.local_addr()?);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        let _ = stop_tx.send(true);
        if let Err(e) = reset_task.await {
            tracing::warn!("Reset task ended abnormally: {}", e);
        }

        served?;
        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
