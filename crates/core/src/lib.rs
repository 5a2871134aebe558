#![forbid(unsafe_code)]

pub mod analysis;
pub mod model;
pub mod time;

pub use analysis::{AnalysisRecord, AnalysisReport, ReconcileError, reconcile};
pub use model::{
    AnswerKey, AnswerKeyEntry, AnswerSheet, GivenAnswer, OptionKey, Question, QuestionId,
    QuizCode, ResultId, SessionTiming, SubmissionSnapshot, TimingError,
};
pub use time::Clock;
