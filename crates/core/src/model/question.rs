use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{OptionKey, QuestionId};

/// A single quiz question with its answer options.
///
/// Immutable once fetched; the option map keeps a stable iteration order
/// so the options always render in the same sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: BTreeMap<OptionKey, String>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: impl IntoIterator<Item = (OptionKey, String)>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            options: options.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &BTreeMap<OptionKey, String> {
        &self.options
    }

    /// Display text for an option, if the key exists on this question.
    #[must_use]
    pub fn option_text(&self, key: &OptionKey) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn has_option(&self, key: &OptionKey) -> bool {
        self.options.contains_key(key)
    }
}
