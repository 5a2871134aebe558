use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::answer::AnswerSheet;
use crate::model::ids::QuizCode;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimingError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("timing is already completed")]
    AlreadyCompleted,
}

/// Start and end timestamps of a single quiz attempt.
///
/// `started_at` is fixed when the quiz is fetched; `completed_at` is set
/// exactly once, at submission, and marks the attempt as terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionTiming {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Mark the attempt complete.
    ///
    /// # Errors
    ///
    /// Returns `TimingError::AlreadyCompleted` if called a second time.
    /// Returns `TimingError::InvalidTimeRange` if `completed_at` is before
    /// `started_at`.
    pub fn complete(&mut self, completed_at: DateTime<Utc>) -> Result<(), TimingError> {
        if self.completed_at.is_some() {
            return Err(TimingError::AlreadyCompleted);
        }
        if completed_at < self.started_at {
            return Err(TimingError::InvalidTimeRange);
        }
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Elapsed time between start and completion, once complete.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}

/// Immutable snapshot handed to the submission sink when an attempt ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSnapshot {
    pub quiz_code: QuizCode,
    pub answers: AnswerSheet,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SubmissionSnapshot {
    /// Seconds spent on the attempt.
    #[must_use]
    pub fn time_taken_seconds(&self) -> i64 {
        (self.completed_at - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn timing_completes_exactly_once() {
        let now = fixed_now();
        let mut timing = SessionTiming::new(now);
        assert!(!timing.is_complete());

        timing.complete(now + Duration::minutes(5)).unwrap();
        assert!(timing.is_complete());
        assert_eq!(timing.completed_at(), Some(now + Duration::minutes(5)));
        assert_eq!(timing.duration(), Some(Duration::minutes(5)));

        let err = timing.complete(now + Duration::minutes(6)).unwrap_err();
        assert_eq!(err, TimingError::AlreadyCompleted);
        assert_eq!(timing.completed_at(), Some(now + Duration::minutes(5)));
    }

    #[test]
    fn timing_rejects_end_before_start() {
        let now = fixed_now();
        let mut timing = SessionTiming::new(now);
        let err = timing.complete(now - Duration::seconds(1)).unwrap_err();
        assert_eq!(err, TimingError::InvalidTimeRange);
        assert!(!timing.is_complete());
    }

    #[test]
    fn snapshot_reports_time_taken() {
        let now = fixed_now();
        let snapshot = SubmissionSnapshot {
            quiz_code: QuizCode::new(1),
            answers: AnswerSheet::new(),
            started_at: now,
            completed_at: now + Duration::seconds(95),
        };
        assert_eq!(snapshot.time_taken_seconds(), 95);
    }
}
