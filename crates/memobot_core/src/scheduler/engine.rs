//! Pure scheduling transition.
//!
//! # Invariants
//! - `again`: streak resets to 0, interval resets to the floor, due today.
//! - `hard`/`easy`: streak grows by one, interval never shrinks, and the
//!   `easy` interval is never shorter than the `hard` one.
//! - The returned due date is never earlier than `today`.

use super::{Rating, SchedulerError};
use crate::config::SchedulerConfig;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// The `(interval, streak)` pair that drives the next computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceState {
    pub interval_days: u32,
    pub streak: u32,
}

/// Engine output: the successor state and the day the task is due again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub state: RecurrenceState,
    pub due_date: NaiveDate,
}

/// Computes the schedule that follows `current` after `rating` on `today`.
///
/// # Errors
/// - `InvalidState` when `current.interval_days` is below
///   `min_interval_days`, when the streak would overflow, or when the due
///   date is not representable.
///
/// Grown intervals are clamped to `max_interval_days`, or to the current
/// interval when that is already above the ceiling.
pub fn next_schedule(
    config: &SchedulerConfig,
    current: RecurrenceState,
    rating: Rating,
    today: NaiveDate,
) -> Result<Schedule, SchedulerError> {
    check_state(config, current)?;

    let state = match rating {
        Rating::Again => {
            return Ok(Schedule {
                state: RecurrenceState {
                    interval_days: config.min_interval_days(),
                    streak: 0,
                },
                due_date: today,
            });
        }
        Rating::Hard => RecurrenceState {
            interval_days: hard_interval(config, current.interval_days),
            streak: next_streak(current.streak)?,
        },
        Rating::Easy => RecurrenceState {
            interval_days: easy_interval(config, current.interval_days),
            streak: next_streak(current.streak)?,
        },
    };

    let due_date = today
        .checked_add_days(Days::new(u64::from(state.interval_days)))
        .ok_or_else(|| {
            SchedulerError::InvalidState(format!(
                "due date {today} + {} days is out of range",
                state.interval_days
            ))
        })?;

    Ok(Schedule { state, due_date })
}

fn check_state(config: &SchedulerConfig, current: RecurrenceState) -> Result<(), SchedulerError> {
    if current.interval_days < config.min_interval_days() {
        return Err(SchedulerError::InvalidState(format!(
            "interval_days {} is below the floor of {}",
            current.interval_days,
            config.min_interval_days()
        )));
    }
    Ok(())
}

fn next_streak(streak: u32) -> Result<u32, SchedulerError> {
    streak
        .checked_add(1)
        .ok_or_else(|| SchedulerError::InvalidState(format!("streak {streak} overflows")))
}

fn hard_interval(config: &SchedulerConfig, interval_days: u32) -> u32 {
    scale(interval_days, config.hard_multiplier())
        .max(config.min_interval_days() + 1)
        .min(ceiling_for(config, interval_days))
}

fn easy_interval(config: &SchedulerConfig, interval_days: u32) -> u32 {
    scale(interval_days, config.easy_multiplier())
        .max(hard_interval(config, interval_days))
        .min(ceiling_for(config, interval_days))
}

fn ceiling_for(config: &SchedulerConfig, interval_days: u32) -> u32 {
    config.max_interval_days().max(interval_days)
}

fn scale(interval_days: u32, multiplier: f64) -> u32 {
    let scaled = (f64::from(interval_days) * multiplier).ceil();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}
