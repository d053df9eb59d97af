mod answer;
mod ids;
mod question;
pub mod results;
mod selection;

pub use ids::{
    CategoryId, DifficultyId, OptionId, ParseIdError, QuestionId, SessionToken, TopicId,
};

pub use answer::{Answer, AnswerFeedback};
pub use question::{CategoryRef, DifficultyRef, Question, QuestionOption};
pub use results::{
    CategoryStats, Mastery, PerformanceLevel, QuizResults, ResultSession, StudyRecommendation,
};
pub use selection::{DEFAULT_CATEGORY, QuizSelection, SelectionError};
