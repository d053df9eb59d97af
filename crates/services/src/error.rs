//! Shared error types for the services crate.

use quiz_core::model::OptionId;
use thiserror::Error;

/// Failures talking to the quiz backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    /// The credentials were rejected (401/403).
    #[error("{0}")]
    Unauthorized(String),
    #[error("could not reach the quiz server: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid quiz server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors emitted by `QuizSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no questions available for this selection")]
    EmptyResult,
    #[error("no quiz session in progress")]
    NoSession,
    #[error("no question is waiting for an answer")]
    NoActiveQuestion,
    #[error("the current question has already been answered")]
    AlreadyAnswered,
    #[error("option {0} does not belong to the current question")]
    UnknownOption(OptionId),
}

impl QuizError {
    /// True when the backend rejected the credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized(_)))
    }
}
