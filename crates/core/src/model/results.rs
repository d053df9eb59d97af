use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse performance band reported by the backend for a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PerformanceLevel {
    Advanced,
    Intermediate,
    Beginner,
}

impl PerformanceLevel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Advanced => "Advanced",
            Self::Intermediate => "Intermediate",
            Self::Beginner => "Beginner",
        }
    }
}

impl From<String> for PerformanceLevel {
    fn from(raw: String) -> Self {
        // The backend reports Portuguese labels; anything unknown is a beginner.
        match raw.trim() {
            "Avançado" | "Advanced" => Self::Advanced,
            "Intermediário" | "Intermediate" => Self::Intermediate,
            _ => Self::Beginner,
        }
    }
}

impl From<PerformanceLevel> for String {
    fn from(level: PerformanceLevel) -> Self {
        level.label().to_owned()
    }
}

/// Per-category tally of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub correct: u32,
    pub total: u32,
    pub percentage: f64,
}

/// Server-side view of the finished session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultSession {
    pub id: Option<String>,
    pub status: Option<String>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub total_points: u32,
    /// Seconds.
    pub time_spent: u32,
    pub score: f64,
}

/// Response of the results endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub session: ResultSession,
    pub performance_level: PerformanceLevel,
    /// Average seconds per question.
    #[serde(default)]
    pub average_time: f64,
    #[serde(default)]
    pub category_breakdown: BTreeMap<String, CategoryStats>,
}

/// How well a category went, used to rank study recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mastery {
    Strong,
    Fair,
    Weak,
}

impl Mastery {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Strong
        } else if percentage >= 60.0 {
            Self::Fair
        } else {
            Self::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyRecommendation {
    pub category: String,
    pub percentage: f64,
    pub mastery: Mastery,
}

impl QuizResults {
    /// Final score rounded to a whole percentage.
    #[must_use]
    pub fn rounded_score(&self) -> u32 {
        // Scores are clamped into 0..=100 so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.session.score.clamp(0.0, 100.0).round() as u32;
        rounded
    }

    /// Weakest categories first, at most `limit` entries.
    #[must_use]
    pub fn study_recommendations(&self, limit: usize) -> Vec<StudyRecommendation> {
        let mut items: Vec<StudyRecommendation> = self
            .category_breakdown
            .iter()
            .map(|(category, stats)| StudyRecommendation {
                category: category.clone(),
                percentage: stats.percentage,
                mastery: Mastery::from_percentage(stats.percentage),
            })
            .collect();
        items.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
        items.truncate(limit);
        items
    }
}
