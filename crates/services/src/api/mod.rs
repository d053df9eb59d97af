//! Client side of the quiz REST endpoints.

mod http;

use async_trait::async_trait;
use quiz_core::model::{
    AnswerFeedback, CategoryId, DifficultyId, OptionId, Question, QuestionId, QuizResults,
    QuizSelection, SessionToken, TopicId,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub use http::HttpQuizApi;

/// The quiz endpoints consumed by the client.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// `POST /api/quiz/start`
    async fn start_quiz(&self, request: &StartQuizRequest)
    -> Result<StartQuizResponse, ApiError>;

    /// `POST /api/quiz/answer`
    async fn submit_answer(&self, request: &SubmitAnswerRequest)
    -> Result<AnswerFeedback, ApiError>;

    /// `POST /api/quiz/complete`
    async fn complete_quiz(&self, request: &CompleteQuizRequest)
    -> Result<CompletionAck, ApiError>;

    /// `GET /api/quiz/results/:sessionToken`
    async fn results(&self, token: &SessionToken) -> Result<QuizResults, ApiError>;
}

/// Body of the start request; exactly one of the selection shapes is sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<TopicId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_id: Option<DifficultyId>,
}

impl From<&QuizSelection> for StartQuizRequest {
    fn from(selection: &QuizSelection) -> Self {
        match selection {
            QuizSelection::Default | QuizSelection::Category(_) => Self {
                category: selection.category_name().map(str::to_owned),
                ..Self::default()
            },
            QuizSelection::CategoryId(id) => Self {
                category_id: Some(id.clone()),
                ..Self::default()
            },
            QuizSelection::Scoped {
                category_id,
                topic_id,
                difficulty_id,
            } => Self {
                category: None,
                category_id: Some(category_id.clone()),
                topic_id: Some(topic_id.clone()),
                difficulty_id: Some(difficulty_id.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizResponse {
    pub session_token: SessionToken,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub session_token: SessionToken,
    pub question_id: QuestionId,
    pub option_id: OptionId,
    pub time_spent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteQuizRequest {
    pub session_token: SessionToken,
    pub time_spent: u32,
}

/// Confirmation returned by the complete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct CompletionAck {
    pub success: Option<bool>,
    pub message: Option<String>,
}
