use serde::{Deserialize, Serialize};

use crate::model::{OptionId, QuestionId, QuestionOption};

/// A recorded answer for one question of the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub option_id: OptionId,
    pub is_correct: bool,
    /// Whole seconds spent on the question.
    pub time_spent: u32,
}

/// Feedback returned by the backend after an answer is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub is_correct: bool,
    #[serde(default)]
    pub correct_option: Option<QuestionOption>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub points_earned: u32,
}
