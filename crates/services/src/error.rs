//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::analysis::ReconcileError;
use quiz_core::model::{QuestionId, QuizCode, ResultId, TimingError};

/// Errors emitted by `QuizSession`.
///
/// A rejected operation never mutates the session; callers surface the
/// error and the attempt continues (or stays terminal).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("quiz has already been submitted")]
    AlreadySubmitted,

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error(transparent)]
    Timing(#[from] TimingError),
}

/// Errors surfaced by quiz backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("no quiz found for code {0}")]
    QuizNotFound(QuizCode),

    #[error("no result found for id {0}")]
    ResultNotFound(ResultId),

    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Errors emitted by `QuizFlowService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `AnalysisService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
