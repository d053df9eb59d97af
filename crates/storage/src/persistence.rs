use std::sync::Arc;

use log::{debug, warn};
use quiz_core::{QuizAction, QuizState, SessionPhase};

use crate::repository::{KeyValueStore, StorageError};
use crate::snapshot::{SessionSnapshot, restore_state};

/// Local-storage key holding the resumable attempt.
pub const SESSION_KEY: &str = "currentQuizSession";

/// Mirrors the quiz state into local storage after each reduction.
///
/// Writes are best-effort: failures are logged and swallowed, so the stored
/// copy can lag behind the in-memory state. The backend remains the source
/// of truth for scoring.
#[derive(Clone)]
pub struct SessionPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionPersistence {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: SESSION_KEY.to_owned(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// React to `action` having produced `state`.
    pub async fn observe(&self, action: &QuizAction, state: &QuizState) {
        let result = match action {
            QuizAction::StartQuiz { token, questions } => {
                self.write(&SessionSnapshot::started(token.clone(), questions.clone()))
                    .await
            }
            QuizAction::SubmitAnswer { .. } | QuizAction::NextQuestion => {
                match SessionSnapshot::from_state(state) {
                    Some(snapshot) => self.write(&snapshot).await,
                    None => Ok(()),
                }
            }
            QuizAction::ResetQuiz => self.clear().await,
            QuizAction::SetLoading(_)
            | QuizAction::SetError(_)
            | QuizAction::ClearError
            | QuizAction::SetFeedback { .. } => Ok(()),
        };

        if let Err(err) = result {
            warn!("could not persist quiz session after {}: {err}", action.name());
        }
    }

    /// Load and replay the stored attempt.
    ///
    /// Never fails: unreadable or corrupt entries are logged, removed and
    /// reported as the idle state.
    pub async fn restore(&self) -> QuizState {
        let raw = match self.store.get(&self.key).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!("could not read stored quiz session: {err}");
                return QuizState::default();
            }
        };
        let Some(raw) = raw else {
            return QuizState::default();
        };

        let state = restore_state(Some(&raw));
        if state.phase() == SessionPhase::Idle {
            if let Err(err) = self.clear().await {
                warn!("could not discard stored quiz session: {err}");
            }
        } else {
            debug!(
                "restored quiz session at question {} of {}",
                state.current_question_index(),
                state.questions().len()
            );
        }
        state
    }

    /// Delete the stored attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(&self.key).await
    }

    async fn write(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        let raw = snapshot
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &raw).await
    }
}
