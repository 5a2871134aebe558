use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use quiz_core::model::{
    AnswerKey, AnswerSheet, Question, QuizCode, ResultId, SubmissionSnapshot,
};

use crate::error::BackendError;

/// A fetched quiz: the ordered question bank plus the server-chosen start
/// time for the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizFetch {
    pub questions: Vec<Question>,
    pub started_at: DateTime<Utc>,
}

/// The authoritative score returned by the submission sink.
///
/// The core only shapes the request; it never interprets or recomputes
/// these numbers. The client-side reconciliation is a separate explanation
/// of this score, produced later from an `AnalysisBundle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub score: u32,
    pub total: u32,
    pub percentage: Option<u32>,
    pub points: u32,
    pub time_taken: Option<i64>,
}

/// Everything needed to reconcile a stored attempt client-side: the
/// question bank, the answer key, and the given answers as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisBundle {
    pub title: String,
    pub questions: Vec<Question>,
    pub answer_key: AnswerKey,
    pub sheet: AnswerSheet,
    pub server_score: u32,
    pub server_total: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Boundary contract for the three network collaborators that flank the
/// session core: question-bank fetch, submission sink, answer-key fetch.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Fetch the question bank for a join code.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::QuizNotFound` for an unknown code, or other
    /// backend errors.
    async fn fetch_quiz(&self, code: QuizCode) -> Result<QuizFetch, BackendError>;

    /// Transmit a submission snapshot and receive the authoritative score.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the submission cannot be delivered.
    async fn submit_answers(
        &self,
        snapshot: &SubmissionSnapshot,
    ) -> Result<SubmitOutcome, BackendError>;

    /// Fetch the stored attempt plus question bank and answer key for
    /// client-side reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::ResultNotFound` for an unknown result id, or
    /// other backend errors.
    async fn fetch_analysis(
        &self,
        code: QuizCode,
        result: ResultId,
    ) -> Result<AnalysisBundle, BackendError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredQuiz {
    title: String,
    questions: Vec<Question>,
    answer_key: AnswerKey,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredResult {
    quiz_code: QuizCode,
    sheet: AnswerSheet,
    score: u32,
    submitted_at: DateTime<Utc>,
}

/// Simple in-memory backend for testing and prototyping.
///
/// Scores submissions itself by exact option-key match, so tests can check
/// that the client-side reconciliation agrees with the "server" score.
#[derive(Clone, Default)]
pub struct InMemoryQuizBackend {
    quizzes: Arc<Mutex<HashMap<QuizCode, StoredQuiz>>>,
    results: Arc<Mutex<HashMap<ResultId, StoredResult>>>,
}

impl InMemoryQuizBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a quiz so sessions can be started against it.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Connection` if the backing state is poisoned.
    pub fn seed_quiz(
        &self,
        code: QuizCode,
        title: impl Into<String>,
        questions: Vec<Question>,
        answer_key: AnswerKey,
        started_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.insert(
            code,
            StoredQuiz {
                title: title.into(),
                questions,
                answer_key,
                started_at,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl QuizBackend for InMemoryQuizBackend {
    async fn fetch_quiz(&self, code: QuizCode) -> Result<QuizFetch, BackendError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let quiz = guard.get(&code).ok_or(BackendError::QuizNotFound(code))?;
        Ok(QuizFetch {
            questions: quiz.questions.clone(),
            started_at: quiz.started_at,
        })
    }

    async fn submit_answers(
        &self,
        snapshot: &SubmissionSnapshot,
    ) -> Result<SubmitOutcome, BackendError> {
        // Score under the quizzes guard alone; the guard is released before
        // the results map is touched so no method ever holds both locks.
        let (score, total) = {
            let quizzes = self
                .quizzes
                .lock()
                .map_err(|e| BackendError::Connection(e.to_string()))?;
            let quiz = quizzes
                .get(&snapshot.quiz_code)
                .ok_or(BackendError::QuizNotFound(snapshot.quiz_code))?;

            let score = snapshot
                .answers
                .iter()
                .filter(|given| {
                    quiz.answer_key.correct_option(given.question_id) == Some(&given.option)
                })
                .count() as u32;
            (score, quiz.questions.len() as u32)
        };
        let percentage = if total == 0 {
            None
        } else {
            Some((f64::from(score) * 100.0 / f64::from(total)).round() as u32)
        };

        let mut results = self
            .results
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let result_id = ResultId::new(results.len() as u64 + 1);
        results.insert(
            result_id,
            StoredResult {
                quiz_code: snapshot.quiz_code,
                sheet: snapshot.answers.clone(),
                score,
                submitted_at: snapshot.completed_at,
            },
        );

        Ok(SubmitOutcome {
            score,
            total,
            percentage,
            points: score * 10,
            time_taken: Some(snapshot.time_taken_seconds()),
        })
    }

    async fn fetch_analysis(
        &self,
        code: QuizCode,
        result: ResultId,
    ) -> Result<AnalysisBundle, BackendError> {
        // Clone the stored attempt out and release the results guard before
        // the quizzes lock is taken; the two maps are never locked together.
        let stored = {
            let results = self
                .results
                .lock()
                .map_err(|e| BackendError::Connection(e.to_string()))?;
            results
                .get(&result)
                .filter(|r| r.quiz_code == code)
                .cloned()
                .ok_or(BackendError::ResultNotFound(result))?
        };

        let quizzes = self
            .quizzes
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let quiz = quizzes.get(&code).ok_or(BackendError::QuizNotFound(code))?;

        Ok(AnalysisBundle {
            title: quiz.title.clone(),
            questions: quiz.questions.clone(),
            answer_key: quiz.answer_key.clone(),
            sheet: stored.sheet,
            server_score: stored.score,
            server_total: quiz.questions.len() as u32,
            submitted_at: stored.submitted_at,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerKeyEntry, GivenAnswer, OptionKey, QuestionId};
    use quiz_core::time::fixed_now;

    fn build_question(id: u64) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}"),
            [
                (OptionKey::from("A"), "alpha".to_string()),
                (OptionKey::from("B"), "beta".to_string()),
            ],
        )
    }

    fn seeded_backend() -> InMemoryQuizBackend {
        let backend = InMemoryQuizBackend::new();
        backend
            .seed_quiz(
                QuizCode::new(42),
                "Sample quiz",
                vec![build_question(1), build_question(2)],
                AnswerKey::from_entries([
                    AnswerKeyEntry::new(QuestionId::new(1), OptionKey::from("A")),
                    AnswerKeyEntry::new(QuestionId::new(2), OptionKey::from("B")),
                ]),
                fixed_now(),
            )
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn fetch_quiz_returns_seeded_questions() {
        let backend = seeded_backend();
        let fetch = backend.fetch_quiz(QuizCode::new(42)).await.unwrap();
        assert_eq!(fetch.questions.len(), 2);
        assert_eq!(fetch.started_at, fixed_now());
    }

    #[tokio::test]
    async fn unknown_quiz_code_is_not_found() {
        let backend = seeded_backend();
        let err = backend.fetch_quiz(QuizCode::new(999)).await.unwrap_err();
        assert!(matches!(err, BackendError::QuizNotFound(_)));
    }

    #[tokio::test]
    async fn submit_scores_and_stores_the_attempt() {
        let backend = seeded_backend();
        let mut sheet = AnswerSheet::new();
        sheet.record(GivenAnswer::new(
            QuestionId::new(1),
            OptionKey::from("A"),
            "alpha",
        ));
        sheet.record(GivenAnswer::new(
            QuestionId::new(2),
            OptionKey::from("A"),
            "alpha",
        ));

        let snapshot = SubmissionSnapshot {
            quiz_code: QuizCode::new(42),
            answers: sheet,
            started_at: fixed_now(),
            completed_at: fixed_now() + chrono::Duration::seconds(30),
        };

        let outcome = backend.submit_answers(&snapshot).await.unwrap();
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.percentage, Some(50));
        assert_eq!(outcome.time_taken, Some(30));

        let bundle = backend
            .fetch_analysis(QuizCode::new(42), ResultId::new(1))
            .await
            .unwrap();
        assert_eq!(bundle.server_score, 1);
        assert_eq!(bundle.sheet.len(), 2);
        assert_eq!(bundle.title, "Sample quiz");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_submits_and_analyses_make_progress() {
        let backend = seeded_backend();

        let mut sheet = AnswerSheet::new();
        sheet.record(GivenAnswer::new(
            QuestionId::new(1),
            OptionKey::from("A"),
            "alpha",
        ));
        let snapshot = SubmissionSnapshot {
            quiz_code: QuizCode::new(42),
            answers: sheet,
            started_at: fixed_now(),
            completed_at: fixed_now() + chrono::Duration::seconds(30),
        };
        backend.submit_answers(&snapshot).await.unwrap();

        let submitter = {
            let backend = backend.clone();
            let snapshot = snapshot.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    backend.submit_answers(&snapshot).await.unwrap();
                }
            })
        };
        let analyser = {
            let backend = backend.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    backend
                        .fetch_analysis(QuizCode::new(42), ResultId::new(1))
                        .await
                        .unwrap();
                }
            })
        };

        let both = async {
            submitter.await.unwrap();
            analyser.await.unwrap();
        };
        tokio::time::timeout(std::time::Duration::from_secs(10), both)
            .await
            .expect("backend calls finished without blocking each other");
    }

    #[tokio::test]
    async fn analysis_for_unknown_result_is_not_found() {
        let backend = seeded_backend();
        let err = backend
            .fetch_analysis(QuizCode::new(42), ResultId::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ResultNotFound(_)));
    }
}
