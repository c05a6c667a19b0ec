use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How close a shift is to its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// End time has passed
    EndingNow,
    /// Less than 30 minutes left
    EndingSoon,
    /// Less than two hours left
    EndingLater,
    PlentyOfTime,
}

impl ShiftStatus {
    /// Classify the time left between `now` and `end`
    pub fn from_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = end - now;
        if remaining < Duration::zero() {
            ShiftStatus::EndingNow
        } else if remaining < Duration::minutes(30) {
            ShiftStatus::EndingSoon
        } else if remaining < Duration::minutes(120) {
            ShiftStatus::EndingLater
        } else {
            ShiftStatus::PlentyOfTime
        }
    }

    /// CSS class of the status dot
    pub fn css_class(self) -> &'static str {
        match self {
            ShiftStatus::EndingNow => "status-ending-now",
            ShiftStatus::EndingSoon => "status-ending-soon",
            ShiftStatus::EndingLater => "status-ending-later",
            ShiftStatus::PlentyOfTime => "status-plenty",
        }
    }
}
