use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{OptionKey, QuestionId};

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// One entry of a quiz answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    pub question_id: QuestionId,
    pub correct_option: OptionKey,
}

impl AnswerKeyEntry {
    #[must_use]
    pub fn new(question_id: QuestionId, correct_option: OptionKey) -> Self {
        Self {
            question_id,
            correct_option,
        }
    }
}

/// Mapping from question id to the correct option for that question.
///
/// Entries are unique per question upstream; if duplicates arrive anyway,
/// the last entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey {
    entries: BTreeMap<QuestionId, OptionKey>,
}

impl AnswerKey {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = AnswerKeyEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.question_id, e.correct_option))
                .collect(),
        }
    }

    /// The correct option for a question, if the key has an entry for it.
    #[must_use]
    pub fn correct_option(&self, question_id: QuestionId) -> Option<&OptionKey> {
        self.entries.get(&question_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//
// ─── GIVEN ANSWERS ─────────────────────────────────────────────────────────────
//

/// The option a participant selected for a question.
///
/// `value` is a denormalized copy of the option's display text captured at
/// selection time, so a report renders even if the question bank changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GivenAnswer {
    pub question_id: QuestionId,
    pub option: OptionKey,
    pub value: String,
}

impl GivenAnswer {
    #[must_use]
    pub fn new(question_id: QuestionId, option: OptionKey, value: impl Into<String>) -> Self {
        Self {
            question_id,
            option,
            value: value.into(),
        }
    }
}

/// Insertion-ordered collection of given answers, keyed by question id.
///
/// Re-answering a question overwrites the earlier answer in place: the
/// sheet keeps the position of the first answer, not the latest one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    answers: Vec<GivenAnswer>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, overwriting any earlier answer for the same question.
    pub fn record(&mut self, answer: GivenAnswer) {
        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
    }

    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<&GivenAnswer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    #[must_use]
    pub fn contains(&self, question_id: QuestionId) -> bool {
        self.get(question_id).is_some()
    }

    /// Iterate answers in the order they were first recorded.
    pub fn iter(&self) -> impl Iterator<Item = &GivenAnswer> {
        self.answers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<GivenAnswer> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = GivenAnswer>>(iter: I) -> Self {
        let mut sheet = Self::new();
        for answer in iter {
            sheet.record(answer);
        }
        sheet
    }
}

impl<'a> IntoIterator for &'a AnswerSheet {
    type Item = &'a GivenAnswer;
    type IntoIter = std::slice::Iter<'a, GivenAnswer>;

    fn into_iter(self) -> Self::IntoIter {
        self.answers.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
