/// Public library interface for the Habit Momentum MCP server
///
/// This module exports the server together with the habit state store, the
/// streak and momentum calculations and the storage backends, so they can be
/// used by other applications or tests.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod analytics;
pub mod domain;
pub mod mcp;
pub mod notifications;
pub mod state;
pub mod storage;
pub mod tools;

// Re-export public modules and types
pub use analytics::{MomentumColor, MomentumSummary, TimelineOptions, TimelineView};
pub use domain::*;
pub use notifications::{LogScheduler, ReminderScheduler, SchedulerError};
pub use state::{HabitStatus, HabitStore, Outcome, Progress, StoreError};
pub use storage::{HabitStorage, MemoryStorage, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit tracker server that implements the MCP protocol
///
/// This server owns the habit state store (backed by SQLite or memory), the
/// reminder scheduler and the default timeline layout.
pub struct HabitTrackerServer {
    store: HabitStore<Box<dyn HabitStorage>>,
    scheduler: Arc<dyn ReminderScheduler>,
    timeline_defaults: TimelineOptions,
}

impl HabitTrackerServer {
    /// Create a server backed by the SQLite database at `db_path`
    ///
    /// This will initialize the database schema if it doesn't already exist.
    pub fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Momentum server with database: {:?}", db_path);
        let storage = SqliteStorage::new(db_path)?;
        Self::with_parts(Box::new(storage), Arc::new(SystemClock), Arc::new(LogScheduler))
    }

    /// Create a server whose state is lost on exit
    pub fn in_memory() -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Momentum server with in-memory storage");
        Self::with_parts(
            Box::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            Arc::new(LogScheduler),
        )
    }

    /// Assemble a server from its collaborators
    pub fn with_parts(
        storage: Box<dyn HabitStorage>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn ReminderScheduler>,
    ) -> Result<Self, ServerError> {
        let store = HabitStore::open(storage, clock)?;
        Ok(Self {
            store,
            scheduler,
            timeline_defaults: TimelineOptions::default(),
        })
    }

    /// Change the timeline layout used when a request leaves options out
    pub fn with_timeline_defaults(mut self, defaults: TimelineOptions) -> Self {
        self.timeline_defaults = defaults;
        self
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Reminders of all stored habits are re-planned first. This method
    /// returns when stdin is closed.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let plans = self.store.reminder_plans();
        let failed = notifications::schedule_all(Arc::clone(&self.scheduler), &plans).await;
        tracing::info!(
            "Server started successfully, found {} existing habits ({} reminder plans failed)",
            plans.len(),
            failed
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn store(&self) -> &HabitStore<Box<dyn HabitStorage>> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HabitStore<Box<dyn HabitStorage>> {
        &mut self.store
    }

    pub fn scheduler(&self) -> &Arc<dyn ReminderScheduler> {
        &self.scheduler
    }

    pub fn timeline_defaults(&self) -> TimelineOptions {
        self.timeline_defaults
    }
}
