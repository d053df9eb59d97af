use crate::model::{Answer, AnswerFeedback, Question, SessionToken};

use super::progress::QuizProgress;

/// Phase of the attempt, derived from the state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session token yet.
    Idle,
    /// A question is on screen and can be answered.
    InProgress,
    /// The last answer's feedback is being shown.
    AwaitingFeedback,
    /// Every question has been passed; the caller moves on to results.
    Complete,
}

/// In-memory state of a quiz attempt.
///
/// Invariants kept by the reducer:
/// - `current_question_index <= questions.len()`
/// - `answers.len() <= current_question_index + 1`
/// - `0.0 <= score <= 100.0`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuizState {
    pub(crate) session_token: Option<SessionToken>,
    pub(crate) questions: Vec<Question>,
    pub(crate) current_question_index: usize,
    pub(crate) answers: Vec<Answer>,
    pub(crate) score: f64,
    pub(crate) is_loading: bool,
    pub(crate) error: Option<String>,
    pub(crate) show_feedback: bool,
    pub(crate) feedback_data: Option<AnswerFeedback>,
}

impl QuizState {
    #[must_use]
    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session_token.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Percentage of the whole quiz answered correctly so far.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn show_feedback(&self) -> bool {
        self.show_feedback
    }

    #[must_use]
    pub fn feedback_data(&self) -> Option<&AnswerFeedback> {
        self.feedback_data.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.session_token.is_none() {
            SessionPhase::Idle
        } else if self.show_feedback {
            SessionPhase::AwaitingFeedback
        } else if self.current_question_index >= self.questions.len() {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress
        }
    }

    /// Question at the cursor, or `None` once the quiz is past its last question.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    /// True when the cursor sits on the final question.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        !self.questions.is_empty() && self.current_question_index + 1 >= self.questions.len()
    }

    /// True when the question under the cursor already has a recorded answer.
    #[must_use]
    pub fn current_answered(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.answers.iter().any(|a| a.question_id == q.id))
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    #[must_use]
    pub fn total_time_spent(&self) -> u32 {
        self.answers
            .iter()
            .fold(0_u32, |acc, a| acc.saturating_add(a.time_spent))
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        QuizProgress {
            total,
            answered: self.answers.len(),
            remaining: total.saturating_sub(self.current_question_index),
            is_complete: self.session_token.is_some()
                && self.current_question_index >= total,
        }
    }
}
