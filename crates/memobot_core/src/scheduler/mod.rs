//! Rating-driven scheduling engine.
//!
//! # Responsibility
//! - Interpret review ratings.
//! - Map a recurrence state plus a rating to the next due date.
//!
//! # Invariants
//! - The engine is stateless and never touches storage or task identity.
//! - Invalid input is rejected, never silently corrected.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod engine;
mod rating;

pub use engine::{next_schedule, RecurrenceState, Schedule};
pub use rating::Rating;

/// Errors raised while parsing ratings or computing a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Rating label or code is not one of `easy|hard|again`.
    InvalidRating(String),
    /// Recurrence state is outside the configured bounds.
    InvalidState(String),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRating(value) => {
                write!(f, "invalid rating `{value}`; expected easy|hard|again")
            }
            Self::InvalidState(details) => write!(f, "invalid recurrence state: {details}"),
        }
    }
}

impl Error for SchedulerError {}
