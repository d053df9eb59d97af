#![forbid(unsafe_code)]

pub mod api;
pub mod auth_events;
pub mod config;
pub mod error;
pub mod quiz;

pub use api::{HttpQuizApi, QuizApi};
pub use auth_events::{AuthEvent, AuthEvents, SubscriptionId};
pub use config::ApiConfig;
pub use error::{ApiError, QuizError};
pub use quiz::QuizSessionService;
