use crate::model::{AnswerFeedback, OptionId, Question, QuestionId, SessionToken};

/// Every way the quiz session can change.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizAction {
    /// Toggle the loading flag; also clears any error.
    SetLoading(bool),
    /// Record a user-visible error; also clears the loading flag.
    SetError(String),
    /// Dismiss the current error message.
    ClearError,
    /// Begin (or restart) an attempt with the questions the backend issued.
    StartQuiz {
        token: SessionToken,
        questions: Vec<Question>,
    },
    /// Record the answer to the current question.
    SubmitAnswer {
        question_id: QuestionId,
        option_id: OptionId,
        is_correct: bool,
        time_spent: u32,
        feedback: Option<AnswerFeedback>,
    },
    /// Move to the next question and drop the feedback of the previous one.
    NextQuestion,
    /// Show or hide feedback directly, outside the submit/next flow.
    SetFeedback {
        show: bool,
        data: Option<AnswerFeedback>,
    },
    /// Discard the attempt and return to the initial state.
    ResetQuiz,
}

impl QuizAction {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetLoading(_) => "SET_LOADING",
            Self::SetError(_) => "SET_ERROR",
            Self::ClearError => "CLEAR_ERROR",
            Self::StartQuiz { .. } => "START_QUIZ",
            Self::SubmitAnswer { .. } => "SUBMIT_ANSWER",
            Self::NextQuestion => "NEXT_QUESTION",
            Self::SetFeedback { .. } => "SET_FEEDBACK",
            Self::ResetQuiz => "RESET_QUIZ",
        }
    }
}
