mod answer;
mod ids;
mod question;
mod session;

pub use answer::{AnswerKey, AnswerKeyEntry, AnswerSheet, GivenAnswer};
pub use ids::{OptionKey, QuestionId, QuizCode, ResultId};
pub use question::Question;
pub use session::{SessionTiming, SubmissionSnapshot, TimingError};
