//! Scoring: experience gap, weighted match score, report assembly

pub mod experience_scorer;
pub mod match_scorer;
pub mod summary_generator;

pub use experience_scorer::{ExperienceGapAnalysis, ExperienceScorer, GapStatus};
pub use match_scorer::{MatchScorer, Rating, ScoreBreakdown, ScoringWeights};
pub use summary_generator::{Report, ReportInput, SummaryGenerator};

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
