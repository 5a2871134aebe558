//! Scoring reconciliation: joins a participant's given answers against the
//! question bank and answer key to explain a score question by question.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{AnswerKey, AnswerSheet, OptionKey, Question, QuestionId};

/// Placeholder text when a given answer references a question that is no
/// longer in the bank. The record still renders; the rest of the report is
/// unaffected.
pub const QUESTION_NOT_FOUND: &str = "Question not found";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReconcileError {
    #[error("cannot reconcile against a quiz with zero questions")]
    NoQuestions,

    #[error("too many questions for a single quiz: {len}")]
    TooManyQuestions { len: usize },
}

/// Per-question verdict for one given answer.
///
/// `correct_option` is `None` when the answer key has no entry for the
/// question; the answer then counts as incorrect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRecord {
    pub question_id: QuestionId,
    pub question_text: String,
    pub options: BTreeMap<OptionKey, String>,
    pub given_option: OptionKey,
    pub given_value: String,
    pub correct_option: Option<OptionKey>,
    pub is_correct: bool,
}

/// Aggregate result of reconciling one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    records: Vec<AnalysisRecord>,
    score: u32,
    total: u32,
    percentage: u32,
}

impl AnalysisReport {
    /// Records in the order the participant answered.
    #[must_use]
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    /// Records re-sorted into question-id order, for callers that want the
    /// quiz's own ordering instead of answer order.
    #[must_use]
    pub fn sorted_by_question(&self) -> Vec<AnalysisRecord> {
        let mut sorted = self.records.clone();
        sorted.sort_by_key(|r| r.question_id);
        sorted
    }

    /// Number of correctly answered questions.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of questions in the quiz, answered or not.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// `round(100 * score / total)`.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    /// Number of questions the participant answered.
    #[must_use]
    pub fn answered(&self) -> u32 {
        self.records.len() as u32
    }

    /// Questions with no given answer. These count against the total but
    /// produce no record.
    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total.saturating_sub(self.answered())
    }
}

/// Reconcile given answers against the question bank and answer key.
///
/// Pure and deterministic: identical inputs always yield identical reports.
/// A missing question or key entry degrades the affected record instead of
/// failing the whole report.
///
/// # Errors
///
/// Returns `ReconcileError::NoQuestions` if the question bank is empty; the
/// percentage would be undefined and the caller must treat the quiz as a
/// data-integrity error upstream.
pub fn reconcile(
    questions: &[Question],
    answer_key: &AnswerKey,
    sheet: &AnswerSheet,
) -> Result<AnalysisReport, ReconcileError> {
    if questions.is_empty() {
        return Err(ReconcileError::NoQuestions);
    }
    let total = u32::try_from(questions.len()).map_err(|_| ReconcileError::TooManyQuestions {
        len: questions.len(),
    })?;

    let mut records = Vec::with_capacity(sheet.len());
    let mut score = 0_u32;

    for given in sheet.iter() {
        let question = questions.iter().find(|q| q.id() == given.question_id);
        let correct_option = answer_key.correct_option(given.question_id).cloned();
        let is_correct = correct_option.as_ref() == Some(&given.option);
        if is_correct {
            score = score.saturating_add(1);
        }

        records.push(AnalysisRecord {
            question_id: given.question_id,
            question_text: question
                .map_or_else(|| QUESTION_NOT_FOUND.to_string(), |q| q.text().to_string()),
            options: question.map(|q| q.options().clone()).unwrap_or_default(),
            given_option: given.option.clone(),
            given_value: given.value.clone(),
            correct_option,
            is_correct,
        });
    }

    let percentage = (f64::from(score) * 100.0 / f64::from(total)).round() as u32;

    Ok(AnalysisReport {
        records,
        score,
        total,
        percentage,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
