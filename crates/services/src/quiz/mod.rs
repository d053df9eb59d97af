mod service;

pub use crate::error::QuizError;
pub use service::QuizSessionService;
