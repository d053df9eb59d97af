//! Resumable copy of a quiz attempt.
//!
//! Only the data needed to rebuild the attempt is stored. Feedback is
//! transient and never persisted, so a restored attempt always lands on the
//! question screen even if feedback was showing when it was saved.

use log::warn;
use quiz_core::model::{Answer, Question, SessionToken};
use quiz_core::{QuizAction, QuizState, reduce};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("stored session is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored session is inconsistent: {0}")]
    Inconsistent(String),
}

/// Persisted shape of an in-progress attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_token: SessionToken,
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub score: f64,
}

impl SessionSnapshot {
    /// Snapshot of a freshly started attempt.
    #[must_use]
    pub fn started(session_token: SessionToken, questions: Vec<Question>) -> Self {
        Self {
            session_token,
            questions,
            current_question_index: 0,
            answers: Vec::new(),
            score: 0.0,
        }
    }

    /// Capture `state`, or `None` when no attempt is active.
    #[must_use]
    pub fn from_state(state: &QuizState) -> Option<Self> {
        let session_token = state.session_token()?.clone();
        Some(Self {
            session_token,
            questions: state.questions().to_vec(),
            current_question_index: state.current_question_index(),
            answers: state.answers().to_vec(),
            score: state.score(),
        })
    }

    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` for unparseable input.
    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let total = self.questions.len();
        if self.current_question_index > total {
            return Err(SnapshotError::Inconsistent(format!(
                "question index {} beyond {total} questions",
                self.current_question_index
            )));
        }
        if self.answers.len() > self.current_question_index + 1 {
            return Err(SnapshotError::Inconsistent(format!(
                "{} answers recorded at question index {}",
                self.answers.len(),
                self.current_question_index
            )));
        }
        let reached = &self.questions[..(self.current_question_index + 1).min(total)];
        if let Some(stray) = self
            .answers
            .iter()
            .find(|a| !reached.iter().any(|q| q.id == a.question_id))
        {
            return Err(SnapshotError::Inconsistent(format!(
                "answer for unknown question {}",
                stray.question_id
            )));
        }
        Ok(())
    }

    /// Rebuild the attempt by running the recorded steps through the reducer.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Inconsistent` if the snapshot violates the
    /// session invariants.
    pub fn replay(&self) -> Result<QuizState, SnapshotError> {
        self.validate()?;

        let mut state = reduce(
            QuizState::default(),
            QuizAction::StartQuiz {
                token: self.session_token.clone(),
                questions: self.questions.clone(),
            },
        );

        for step in 0..=self.current_question_index {
            let answer = self.questions.get(step).and_then(|q| {
                self.answers.iter().find(|a| a.question_id == q.id)
            });
            if let Some(answer) = answer {
                state = reduce(
                    state,
                    QuizAction::SubmitAnswer {
                        question_id: answer.question_id.clone(),
                        option_id: answer.option_id.clone(),
                        is_correct: answer.is_correct,
                        time_spent: answer.time_spent,
                        feedback: None,
                    },
                );
            }
            if step < self.current_question_index {
                state = reduce(state, QuizAction::NextQuestion);
            }
        }

        let state = reduce(
            state,
            QuizAction::SetFeedback {
                show: false,
                data: None,
            },
        );

        if (state.score() - self.score).abs() > 1e-6 {
            warn!(
                "stored score {} differs from replayed score {}; keeping replayed value",
                self.score,
                state.score()
            );
        }
        Ok(state)
    }
}

/// Rebuild the attempt stored in `raw`, failing open to the idle state.
///
/// Missing, unparseable or inconsistent data yields `QuizState::default()`.
#[must_use]
pub fn restore_state(raw: Option<&str>) -> QuizState {
    let Some(raw) = raw else {
        return QuizState::default();
    };
    match SessionSnapshot::from_json(raw).and_then(|snapshot| snapshot.replay()) {
        Ok(state) => state,
        Err(err) => {
            warn!("discarding stored quiz session: {err}");
            QuizState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::SessionPhase;
    use quiz_core::model::{AnswerFeedback, OptionId, QuestionId};

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: QuestionId::new(format!("q{i}")),
                text: format!("Question {i}"),
                options: Vec::new(),
                category: None,
                difficulty: None,
                code: None,
                points: None,
            })
            .collect()
    }

    fn answer(state: QuizState, is_correct: bool) -> QuizState {
        let question_id = state.current_question().unwrap().id.clone();
        reduce(
            state,
            QuizAction::SubmitAnswer {
                question_id,
                option_id: OptionId::new("o1"),
                is_correct,
                time_spent: 7,
                feedback: Some(AnswerFeedback {
                    is_correct,
                    correct_option: None,
                    explanation: "see MDN".into(),
                    points_earned: 10,
                }),
            },
        )
    }

    fn started(n: usize) -> QuizState {
        reduce(
            QuizState::default(),
            QuizAction::StartQuiz {
                token: SessionToken::new("tok-1"),
                questions: questions(n),
            },
        )
    }

    #[test]
    fn reload_reproduces_index_and_score_but_not_feedback() {
        let state = answer(started(3), true);
        let state = reduce(state, QuizAction::NextQuestion);
        let raw = SessionSnapshot::from_state(&state).unwrap().to_json().unwrap();

        let restored = restore_state(Some(&raw));

        assert_eq!(restored.current_question_index(), 1);
        assert!((restored.score() - state.score()).abs() < f64::EPSILON);
        assert!(restored.feedback_data().is_none());
        assert_eq!(restored.answers(), state.answers());
    }

    #[test]
    fn reload_mid_feedback_lands_in_progress() {
        let state = answer(started(3), false);
        assert_eq!(state.phase(), SessionPhase::AwaitingFeedback);
        let raw = SessionSnapshot::from_state(&state).unwrap().to_json().unwrap();

        let restored = restore_state(Some(&raw));

        assert_eq!(restored.phase(), SessionPhase::InProgress);
        assert_eq!(restored.current_question_index(), 0);
        assert_eq!(restored.answers().len(), 1);
        assert!(restored.feedback_data().is_none());
    }

    #[test]
    fn skipped_questions_replay_at_their_position() {
        let state = reduce(started(4), QuizAction::NextQuestion);
        let state = answer(state, true);
        let state = reduce(state, QuizAction::NextQuestion);
        let raw = SessionSnapshot::from_state(&state).unwrap().to_json().unwrap();

        let restored = restore_state(Some(&raw));

        assert_eq!(restored.current_question_index(), 2);
        assert_eq!(restored.answers()[0].question_id, QuestionId::new("q1"));
        assert!((restored.score() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn corrupted_json_fails_open() {
        let restored = restore_state(Some("{not json"));
        assert_eq!(restored, QuizState::default());
    }

    #[test]
    fn missing_entry_is_idle() {
        assert_eq!(restore_state(None).phase(), SessionPhase::Idle);
    }

    #[test]
    fn index_beyond_questions_is_inconsistent() {
        let mut snapshot = SessionSnapshot::started(SessionToken::new("t"), questions(2));
        snapshot.current_question_index = 5;

        assert!(matches!(
            snapshot.replay(),
            Err(SnapshotError::Inconsistent(_))
        ));
        let raw = snapshot.to_json().unwrap();
        assert_eq!(restore_state(Some(&raw)), QuizState::default());
    }

    #[test]
    fn snapshot_uses_wire_key_names() {
        let snapshot = SessionSnapshot::started(SessionToken::new("t"), questions(1));
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["sessionToken"], "t");
        assert_eq!(value["currentQuestionIndex"], 0);
        assert!(value["answers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn idle_state_has_no_snapshot() {
        assert!(SessionSnapshot::from_state(&QuizState::default()).is_none());
    }
}
