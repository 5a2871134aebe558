use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::analysis::{AnalysisReport, reconcile};
use quiz_core::model::{QuizCode, ResultId};

use crate::backend::{AnalysisBundle, QuizBackend};
use crate::error::AnalysisError;

/// A stored attempt paired with its client-side explanation.
///
/// `server_score` / `server_total` are the authoritative numbers from the
/// submission sink; `report` re-derives the per-question verdicts from the
/// question bank and answer key so the attempt can be explained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub title: String,
    pub submitted_at: DateTime<Utc>,
    pub server_score: u32,
    pub server_total: u32,
    pub report: AnalysisReport,
}

impl QuizReport {
    /// Build a report from an already-fetched bundle.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Reconcile` if the bundle carries no
    /// questions; an empty bank is a data-integrity error upstream.
    pub fn from_bundle(bundle: &AnalysisBundle) -> Result<Self, AnalysisError> {
        let report = reconcile(&bundle.questions, &bundle.answer_key, &bundle.sheet)?;
        Ok(Self {
            title: bundle.title.clone(),
            submitted_at: bundle.submitted_at,
            server_score: bundle.server_score,
            server_total: bundle.server_total,
            report,
        })
    }
}

/// Facade that fetches a stored attempt and reconciles it for display.
#[derive(Clone)]
pub struct AnalysisService {
    backend: Arc<dyn QuizBackend>,
}

impl AnalysisService {
    #[must_use]
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self { backend }
    }

    /// Load and reconcile the attempt identified by `code` + `result`.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Backend` if the fetch fails and
    /// `AnalysisError::Reconcile` for an empty question bank.
    pub async fn load_report(
        &self,
        code: QuizCode,
        result: ResultId,
    ) -> Result<QuizReport, AnalysisError> {
        let bundle = self.backend.fetch_analysis(code, result).await?;
        QuizReport::from_bundle(&bundle)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{
        AnswerKey, AnswerKeyEntry, OptionKey, Question, QuestionId, SubmissionSnapshot,
    };
    use quiz_core::time::fixed_now;

    use crate::backend::InMemoryQuizBackend;

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

    async fn backend_with_submitted_attempt() -> Arc<InMemoryQuizBackend> {
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

        let snapshot = SubmissionSnapshot {
            quiz_code: QuizCode::new(42),
            answers: [
                quiz_core::model::GivenAnswer::new(
                    QuestionId::new(1),
                    OptionKey::from("A"),
                    "alpha",
                ),
                quiz_core::model::GivenAnswer::new(
                    QuestionId::new(2),
                    OptionKey::from("A"),
                    "alpha",
                ),
            ]
            .into_iter()
            .collect(),
            started_at: fixed_now(),
            completed_at: fixed_now() + Duration::minutes(2),
        };
        backend.submit_answers(&snapshot).await.unwrap();
        Arc::new(backend)
    }

    #[tokio::test]
    async fn report_explains_the_server_score() {
        let backend = backend_with_submitted_attempt().await;
        let service = AnalysisService::new(backend);

        let report = service
            .load_report(QuizCode::new(42), ResultId::new(1))
            .await
            .unwrap();

        assert_eq!(report.title, "Sample quiz");
        assert_eq!(report.server_score, 1);
        assert_eq!(report.server_total, 2);

        // Client-side reconciliation agrees with the server.
        assert_eq!(report.report.score(), report.server_score);
        assert_eq!(report.report.total(), report.server_total);

        let records = report.report.records();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_correct);
        assert!(!records[1].is_correct);
        assert_eq!(records[1].correct_option, Some(OptionKey::from("B")));
    }

    #[tokio::test]
    async fn missing_result_surfaces_backend_error() {
        let backend = backend_with_submitted_attempt().await;
        let service = AnalysisService::new(backend);

        let err = service
            .load_report(QuizCode::new(42), ResultId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Backend(_)));
    }
}
