use super::SchedulerError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Review feedback for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Recalled without effort; push the task far out.
    Easy,
    /// Recalled with effort; push the task out a little.
    Hard,
    /// Not recalled; the task is due again right away.
    Again,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Easy, Rating::Hard, Rating::Again];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Hard => "hard",
            Self::Again => "again",
        }
    }

    /// Parses the numeric button codes (`1` easy, `2` hard, `3` again).
    pub fn from_code(code: i64) -> Result<Self, SchedulerError> {
        match code {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Again),
            other => Err(SchedulerError::InvalidRating(other.to_string())),
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts labels case-insensitively, and the numeric codes as text.
impl FromStr for Rating {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "easy" => Ok(Self::Easy),
            "hard" => Ok(Self::Hard),
            "again" => Ok(Self::Again),
            other => match other.parse::<i64>() {
                Ok(code) => Self::from_code(code),
                Err(_) => Err(SchedulerError::InvalidRating(value.to_string())),
            },
        }
    }
}
