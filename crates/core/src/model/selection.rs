use thiserror::Error;

use crate::model::{CategoryId, DifficultyId, TopicId};

/// Category used when a quiz is started without an explicit choice.
pub const DEFAULT_CATEGORY: &str = "JavaScript";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("category name cannot be empty")]
    EmptyCategory,
}

/// What the user picked before starting a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizSelection {
    /// No explicit choice; the backend receives [`DEFAULT_CATEGORY`].
    #[default]
    Default,
    /// Category addressed by display name.
    Category(String),
    /// Category addressed by id, all topics and difficulties.
    CategoryId(CategoryId),
    /// A single topic at one difficulty.
    Scoped {
        category_id: CategoryId,
        topic_id: TopicId,
        difficulty_id: DifficultyId,
    },
}

impl QuizSelection {
    /// Select a category by name.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::EmptyCategory` if the name is blank.
    pub fn category(name: impl Into<String>) -> Result<Self, SelectionError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SelectionError::EmptyCategory);
        }
        Ok(Self::Category(trimmed.to_owned()))
    }

    #[must_use]
    pub fn scoped(category_id: CategoryId, topic_id: TopicId, difficulty_id: DifficultyId) -> Self {
        Self::Scoped {
            category_id,
            topic_id,
            difficulty_id,
        }
    }

    /// Category name sent to the backend, if this selection is name-based.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        match self {
            Self::Default => Some(DEFAULT_CATEGORY),
            Self::Category(name) => Some(name),
            Self::CategoryId(_) | Self::Scoped { .. } => None,
        }
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&CategoryId> {
        match self {
            Self::CategoryId(id) | Self::Scoped { category_id: id, .. } => Some(id),
            Self::Default | Self::Category(_) => None,
        }
    }
}
