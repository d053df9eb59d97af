use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, DifficultyId, OptionId, QuestionId};

/// Category a question belongs to, as embedded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
}

/// Difficulty level attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRef {
    pub id: DifficultyId,
    #[serde(default)]
    pub label: String,
}

/// One selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: OptionId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Older backends send `order` instead of `position`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl QuestionOption {
    fn sort_key(&self) -> u32 {
        self.position.or(self.order).unwrap_or(u32::MAX)
    }
}

/// A multiple-choice question owned by the backend.
///
/// Treated as read-only by the client: it is fixed when a quiz starts and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(default, alias = "question")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

impl Question {
    /// Options in display order: `position`, else `order`, else backend order.
    #[must_use]
    pub fn ordered_options(&self) -> Vec<&QuestionOption> {
        let mut options: Vec<&QuestionOption> = self.options.iter().collect();
        options.sort_by_key(|opt| opt.sort_key());
        options
    }

    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&QuestionOption> {
        self.options.iter().find(|opt| &opt.id == id)
    }

    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}
