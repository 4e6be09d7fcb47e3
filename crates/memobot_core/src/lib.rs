//! Core scheduling logic for memobot review tasks.
//! This crate owns the recurrence invariants; callers only see the
//! `TaskService` operations.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduler;
pub mod service;

pub use config::{ConfigError, CoreConfig, SchedulerConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskStore, TaskScan, TaskStore};
pub use scheduler::{next_schedule, Rating, RecurrenceState, Schedule, SchedulerError};
pub use service::task_service::{ServiceResult, TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
