use chrono::{DateTime, Utc};

use quiz_core::model::{
    AnswerSheet, GivenAnswer, OptionKey, Question, QuestionId, QuizCode, SessionTiming,
    SubmissionSnapshot,
};

use crate::error::SessionError;

/// In-memory state of a single quiz attempt.
///
/// Owns the fetched question set, the current position, the answer sheet and
/// the attempt timing. Navigation is purely sequential; submission is a
/// terminal transition, after which every mutating call is rejected.
/// Starting a new attempt requires a new `QuizSession`.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_code: QuizCode,
    questions: Vec<Question>,
    current: usize,
    answers: AnswerSheet,
    timing: SessionTiming,
}

impl QuizSession {
    /// Create a session from a fetched question set.
    ///
    /// `started_at` is the server-chosen fetch time, passed in explicitly.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided; an empty
    /// fetch means the quiz is still loading, not a valid session.
    pub fn new(
        quiz_code: QuizCode,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            quiz_code,
            questions,
            current: 0,
            answers: AnswerSheet::new(),
            timing: SessionTiming::new(started_at),
        })
    }

    #[must_use]
    pub fn quiz_code(&self) -> QuizCode {
        self.quiz_code
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// 1-based position of the current question, always in `[1, total]`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&GivenAnswer> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Number of questions that have an answer recorded.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.timing.started_at()
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.timing.completed_at()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.timing.is_complete()
    }

    /// How far through the quiz the participant is, as `round(pos / total * 100)`.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        (self.position() as f64 / self.total_questions() as f64 * 100.0).round() as u32
    }

    /// Record an answer, overwriting any earlier answer for that question.
    ///
    /// The question does not have to be the current one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` after submission.
    /// Returns `SessionError::UnknownQuestion` if the id is not in the
    /// question set; answers never reference questions outside the quiz.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        option: OptionKey,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadySubmitted);
        }
        if !self.questions.iter().any(|q| q.id() == question_id) {
            return Err(SessionError::UnknownQuestion(question_id));
        }

        self.answers
            .record(GivenAnswer::new(question_id, option, value));
        Ok(())
    }

    /// Advance to the next question; silent no-op on the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` after submission.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadySubmitted);
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(self.position())
    }

    /// Step back to the previous question; silent no-op on the first one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` after submission.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.current = self.current.saturating_sub(1);
        Ok(self.position())
    }

    /// End the attempt and produce the snapshot for the submission sink.
    ///
    /// The end time is recorded exactly once; a second call is rejected
    /// rather than silently repeated, so a double-click cannot double-count
    /// time or resubmit stale answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` if the attempt already ended.
    /// Returns `SessionError::Timing` if `completed_at` precedes the start.
    pub fn submit(
        &mut self,
        completed_at: DateTime<Utc>,
    ) -> Result<SubmissionSnapshot, SessionError> {
        if self.is_complete() {
            return Err(SessionError::AlreadySubmitted);
        }
        self.timing.complete(completed_at)?;

        Ok(SubmissionSnapshot {
            quiz_code: self.quiz_code,
            answers: self.answers.clone(),
            started_at: self.timing.started_at(),
            completed_at,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
