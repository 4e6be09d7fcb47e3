//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical reviewable task record.
//! - Normalize and validate user-supplied labels and links.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `name` is non-empty after trimming.
//! - `interval_days` is at least one day.
//! - `due_date` changes only through a scheduling decision after creation.

use crate::scheduler::{RecurrenceState, Schedule};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a reviewable task.
pub type TaskId = Uuid;

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty or whitespace only.
    EmptyName,
    /// Recurrence interval is zero days.
    ZeroInterval,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name must not be blank"),
            Self::ZeroInterval => write!(f, "task interval_days must be at least 1"),
        }
    }
}

impl Error for TaskValidationError {}

/// A reviewable task together with its recurrence state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Display label, trimmed.
    pub name: String,
    /// Optional reference link; blank input is stored as `None`.
    pub url: Option<String>,
    /// Calendar day on which the task becomes actionable.
    pub due_date: NaiveDate,
    /// Basis for the next scheduling computation.
    pub interval_days: u32,
    /// Consecutive `easy`/`hard` ratings since the last `again`.
    pub streak: u32,
}

impl Task {
    /// Creates a fresh task with a generated id and a zero streak.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trimming.
    /// - `ZeroInterval` when `interval_days == 0`.
    pub fn new(
        name: &str,
        url: Option<&str>,
        due_date: NaiveDate,
        interval_days: u32,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            url: normalize_url(url),
            due_date,
            interval_days,
            streak: 0,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::EmptyName);
        }
        if self.interval_days == 0 {
            return Err(TaskValidationError::ZeroInterval);
        }
        Ok(())
    }

    /// Returns whether the task is actionable on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date <= today
    }

    pub fn recurrence(&self) -> RecurrenceState {
        RecurrenceState {
            interval_days: self.interval_days,
            streak: self.streak,
        }
    }

    /// Replaces recurrence fields with an engine-computed schedule.
    pub fn apply_schedule(&mut self, schedule: Schedule) {
        self.interval_days = schedule.state.interval_days;
        self.streak = schedule.state.streak;
        self.due_date = schedule.due_date;
    }
}

fn normalize_url(url: Option<&str>) -> Option<String> {
    url.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
