//! Experience scoring and gap classification

use crate::processing::skill_extractor::ExperienceYears;
use crate::scoring::round1;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStatus {
    NoRequirement,
    NotFound,
    MeetsRequirement,
    ExceedsRequirement,
    HighlyExperienced,
    CloseMatch,
    ModerateGap,
    SignificantGap,
    LargeGap,
}

impl GapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapStatus::NoRequirement => "no_requirement",
            GapStatus::NotFound => "not_found",
            GapStatus::MeetsRequirement => "meets_requirement",
            GapStatus::ExceedsRequirement => "exceeds_requirement",
            GapStatus::HighlyExperienced => "highly_experienced",
            GapStatus::CloseMatch => "close_match",
            GapStatus::ModerateGap => "moderate_gap",
            GapStatus::SignificantGap => "significant_gap",
            GapStatus::LargeGap => "large_gap",
        }
    }

    /// Statuses whose recommendation belongs in the report's action list
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            GapStatus::NotFound
                | GapStatus::ModerateGap
                | GapStatus::SignificantGap
                | GapStatus::LargeGap
        )
    }
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceGapAnalysis {
    pub candidate_experience: ExperienceYears,
    pub required_experience: ExperienceYears,
    /// Required minus candidate years; 0 when either side is unknown
    pub gap: i64,
    pub gap_percentage: f64,
    pub status: GapStatus,
    pub message: String,
    pub recommendation: String,
}

/// Stateless: both operations are pure functions of the two year values
#[derive(Debug, Clone, Copy, Default)]
pub struct ExperienceScorer;

impl ExperienceScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_experience_score(
        &self,
        candidate_years: ExperienceYears,
        required_years: ExperienceYears,
    ) -> f64 {
        let required = match required_years {
            ExperienceYears::Unknown => return 70.0,
            ExperienceYears::Known(0) => return 100.0,
            ExperienceYears::Known(years) => years,
        };
        let candidate = match candidate_years {
            ExperienceYears::Unknown => return 50.0,
            ExperienceYears::Known(years) => years,
        };

        let ratio = f64::from(candidate) / f64::from(required);

        let score = if ratio >= 1.0 {
            if ratio <= 1.5 {
                100.0
            } else if ratio <= 2.0 {
                95.0
            } else {
                // Overqualification decays from 90 toward 85
                90.0 - (ratio - 2.0).min(1.0) * 5.0
            }
        } else if ratio >= 0.8 {
            80.0 + (ratio - 0.8) * 50.0
        } else if ratio >= 0.6 {
            70.0 + (ratio - 0.6) * 75.0
        } else if ratio >= 0.4 {
            50.0 + (ratio - 0.4) * 100.0
        } else {
            ratio * 125.0
        };

        round1(score.clamp(0.0, 100.0))
    }

    pub fn analyze_experience_gap(
        &self,
        candidate_years: ExperienceYears,
        required_years: ExperienceYears,
    ) -> ExperienceGapAnalysis {
        let mut analysis = ExperienceGapAnalysis {
            candidate_experience: candidate_years,
            required_experience: required_years,
            gap: 0,
            gap_percentage: 0.0,
            status: GapStatus::NoRequirement,
            message: String::new(),
            recommendation: String::new(),
        };

        let required = match required_years {
            ExperienceYears::Unknown => {
                analysis.message = "No specific experience requirement mentioned".to_string();
                analysis.recommendation = "Highlight relevant skills and projects".to_string();
                return analysis;
            }
            ExperienceYears::Known(0) => {
                analysis.message = "The role states no minimum experience".to_string();
                analysis.recommendation = "Highlight relevant skills and projects".to_string();
                return analysis;
            }
            ExperienceYears::Known(years) => years,
        };

        let candidate = match candidate_years {
            ExperienceYears::Unknown => {
                analysis.status = GapStatus::NotFound;
                analysis.message = "Experience not clearly mentioned in resume".to_string();
                analysis.recommendation = "Add clear experience timeline to resume".to_string();
                return analysis;
            }
            ExperienceYears::Known(years) => years,
        };

        let gap = i64::from(required) - i64::from(candidate);
        let ratio = f64::from(candidate) / f64::from(required);
        analysis.gap = gap;
        analysis.gap_percentage = round1(gap as f64 / f64::from(required) * 100.0);

        let shortfall = gap.abs();
        let (status, message, recommendation) = if candidate >= required {
            if ratio <= 1.5 {
                (
                    GapStatus::MeetsRequirement,
                    format!("Candidate meets experience requirement ({} years)", candidate),
                    "Strong match - emphasize relevant achievements",
                )
            } else if ratio <= 2.0 {
                (
                    GapStatus::ExceedsRequirement,
                    format!(
                        "Candidate exceeds requirement ({} vs {} years)",
                        candidate, required
                    ),
                    "Highlight leadership and mentoring capabilities",
                )
            } else {
                (
                    GapStatus::HighlyExperienced,
                    format!(
                        "Candidate is significantly more experienced ({} vs {} years)",
                        candidate, required
                    ),
                    "May be overqualified - emphasize continued growth motivation",
                )
            }
        } else if ratio >= 0.8 {
            (
                GapStatus::CloseMatch,
                format!(
                    "Candidate is close to requirement ({} vs {} years, {} year gap)",
                    candidate, required, shortfall
                ),
                "Emphasize rapid learning and relevant project impact",
            )
        } else if ratio >= 0.6 {
            (
                GapStatus::ModerateGap,
                format!(
                    "Moderate experience gap ({} vs {} years, {} year gap)",
                    candidate, required, shortfall
                ),
                "Highlight transferable skills and intensive learning experiences",
            )
        } else if ratio >= 0.4 {
            (
                GapStatus::SignificantGap,
                format!(
                    "Significant experience gap ({} vs {} years, {} year gap)",
                    candidate, required, shortfall
                ),
                "Focus on relevant certifications, bootcamps, and project portfolio",
            )
        } else {
            (
                GapStatus::LargeGap,
                format!(
                    "Large experience gap ({} vs {} years, {} year gap)",
                    candidate, required, shortfall
                ),
                "Consider entry-level positions or intensive training programs",
            )
        };

        analysis.status = status;
        analysis.message = message;
        analysis.recommendation = recommendation.to_string();
        analysis
    }
}
