use crate::model::{Answer, QuestionId};

use super::action::QuizAction;
use super::state::QuizState;

/// Apply `action` to `state` and return the next state.
///
/// Pure and infallible. A `SubmitAnswer` that does not target the unanswered
/// question under the cursor of an active session is ignored.
#[must_use]
pub fn reduce(mut state: QuizState, action: QuizAction) -> QuizState {
    match action {
        QuizAction::SetLoading(flag) => {
            state.is_loading = flag;
            state.error = None;
            state
        }
        QuizAction::SetError(message) => {
            state.error = Some(message);
            state.is_loading = false;
            state
        }
        QuizAction::ClearError => {
            state.error = None;
            state
        }
        QuizAction::StartQuiz { token, questions } => QuizState {
            session_token: Some(token),
            questions,
            ..QuizState::default()
        },
        QuizAction::SubmitAnswer {
            question_id,
            option_id,
            is_correct,
            time_spent,
            feedback,
        } => {
            if !accepts_answer(&state, &question_id) {
                return state;
            }
            state.answers.push(Answer {
                question_id,
                option_id,
                is_correct,
                time_spent,
            });
            state.score = score_of(state.correct_count(), state.questions.len());
            state.show_feedback = true;
            state.feedback_data = feedback;
            state
        }
        QuizAction::NextQuestion => {
            if state.current_question_index >= state.questions.len() {
                return state;
            }
            state.current_question_index += 1;
            state.show_feedback = false;
            state.feedback_data = None;
            state
        }
        QuizAction::SetFeedback { show, data } => {
            state.show_feedback = show;
            state.feedback_data = data;
            state
        }
        QuizAction::ResetQuiz => QuizState::default(),
    }
}

impl QuizState {
    /// In-place form of [`reduce`].
    pub fn apply(&mut self, action: QuizAction) {
        *self = reduce(std::mem::take(self), action);
    }
}

fn accepts_answer(state: &QuizState, question_id: &QuestionId) -> bool {
    if state.session_token.is_none() || state.answers.len() > state.current_question_index {
        return false;
    }
    match state.current_question() {
        Some(current) => &current.id == question_id && !state.current_answered(),
        None => false,
    }
}

/// Correct answers as a percentage of ALL questions, not of those answered.
fn score_of(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = (correct as f64 * 100.0) / total as f64;
    score.clamp(0.0, 100.0)
}
