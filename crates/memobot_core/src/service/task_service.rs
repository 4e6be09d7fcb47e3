//! Review task use-case service.
//!
//! # Responsibility
//! - Create, rate, delete and list reviewable tasks.
//! - Route every recurrence change through the scheduling engine.
//!
//! # Invariants
//! - `rate_task` is the only path that changes `due_date`, `interval_days`
//!   or `streak` after creation.
//! - Rating and deleting the same id are serialized; other ids proceed in
//!   parallel.
//! - Listings are ordered by `due_date ASC, id ASC`.
//! - `today` is always supplied by the caller.

use crate::config::SchedulerConfig;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskScan, TaskStore};
use crate::scheduler::{next_schedule, Rating, SchedulerError};
use crate::service::id_locks::TaskLocks;
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors returned by task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Malformed create request.
    InvalidInput(TaskValidationError),
    /// Rating label or code is not `easy|hard|again`.
    InvalidRating(String),
    /// Stored recurrence state is corrupt or out of bounds.
    InvalidState(String),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Storage failure, propagated unchanged.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::InvalidRating(value) => {
                write!(f, "invalid rating `{value}`; expected easy|hard|again")
            }
            Self::InvalidState(details) => write!(f, "invalid task state: {details}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            RepoError::InvalidData(details) => Self::InvalidState(details),
            other => Self::Repo(other),
        }
    }
}

impl From<SchedulerError> for TaskServiceError {
    fn from(value: SchedulerError) -> Self {
        match value {
            SchedulerError::InvalidRating(raw) => Self::InvalidRating(raw),
            SchedulerError::InvalidState(details) => Self::InvalidState(details),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

pub type ServiceResult<T> = Result<T, TaskServiceError>;

/// Task service facade over a `TaskStore`.
///
/// The store is owned and never handed out, so recurrence fields change
/// only through `rate_task`:
///
/// ```compile_fail
/// use memobot_core::{SqliteTaskStore, TaskService};
///
/// let service = TaskService::new(SqliteTaskStore::open_in_memory().unwrap());
/// let _ = service.store();
/// ```
pub struct TaskService<S: TaskStore> {
    store: S,
    config: SchedulerConfig,
    locks: TaskLocks,
}

impl<S: TaskStore> TaskService<S> {
    /// Creates a service with default scheduling constants.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SchedulerConfig::default())
    }

    pub fn with_config(store: S, config: SchedulerConfig) -> Self {
        Self {
            store,
            config,
            locks: TaskLocks::default(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Creates a task that is due on `today`.
    ///
    /// # Errors
    /// - `InvalidInput` when `name` is blank.
    pub fn create_task(
        &self,
        name: &str,
        url: Option<&str>,
        today: NaiveDate,
    ) -> ServiceResult<Task> {
        let task = Task::new(name, url, today, self.config.min_interval_days())?;
        self.store.put_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} due_date={}",
            task.id, task.due_date
        );
        Ok(task)
    }

    /// Reads one task.
    pub fn get_task(&self, id: TaskId) -> ServiceResult<Task> {
        self.store
            .get_task(id)?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Lists every stored task, due or not.
    pub fn list_tasks(&self) -> ServiceResult<Vec<Task>> {
        let mut tasks = self.store.scan_tasks(&TaskScan::all())?;
        sort_by_due(&mut tasks);
        Ok(tasks)
    }

    /// Lists tasks with `due_date <= today`, earliest first.
    pub fn list_due_tasks(&self, today: NaiveDate) -> ServiceResult<Vec<Task>> {
        let mut tasks = self.store.scan_tasks(&TaskScan::due_on_or_before(today))?;
        tasks.retain(|task| task.is_due(today));
        sort_by_due(&mut tasks);
        Ok(tasks)
    }

    /// Applies `rating` to task `id` on `today` and persists the result.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `InvalidState` when the stored recurrence state is out of bounds.
    pub fn rate_task(&self, id: TaskId, rating: Rating, today: NaiveDate) -> ServiceResult<Task> {
        let rated = self.locks.with_lock(id, || -> ServiceResult<Task> {
            let mut task = self.get_task(id)?;
            let schedule = next_schedule(&self.config, task.recurrence(), rating, today)?;
            task.apply_schedule(schedule);
            self.store.put_task(&task)?;
            Ok(task)
        });

        match &rated {
            Ok(task) => info!(
                "event=task_rate module=service status=ok task_id={} rating={} interval_days={} streak={} due_date={}",
                id, rating, task.interval_days, task.streak, task.due_date
            ),
            Err(err) => warn!(
                "event=task_rate module=service status=error task_id={} rating={} error={}",
                id, rating, err
            ),
        }
        rated
    }

    /// Parses a raw rating (`easy|hard|again` or `1|2|3`) and rates the task.
    ///
    /// # Errors
    /// - `InvalidRating` before any store access when `raw` is unrecognized.
    pub fn rate_task_raw(&self, id: TaskId, raw: &str, today: NaiveDate) -> ServiceResult<Task> {
        let rating: Rating = raw.parse()?;
        self.rate_task(id, rating, today)
    }

    /// Removes task `id` permanently.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist, including a repeated delete.
    pub fn delete_task(&self, id: TaskId) -> ServiceResult<()> {
        let deleted = self.locks.with_lock(id, || self.store.delete_task(id));
        match deleted {
            Ok(()) => {
                info!("event=task_delete module=service status=ok task_id={id}");
                Ok(())
            }
            Err(err) => {
                warn!("event=task_delete module=service status=error task_id={id} error={err}");
                Err(err.into())
            }
        }
    }
}

fn sort_by_due(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
}
