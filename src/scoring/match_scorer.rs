//! Weighted match scoring

use crate::error::{Result, ResumeMatcherError};
use crate::processing::skill_extractor::ExperienceYears;
use crate::scoring::round1;
use serde::{Deserialize, Serialize};
use std::fmt;

const WEIGHT_TOLERANCE: f64 = 1e-6;
/// Fuzzy and semantic matches count for this fraction of an exact match
const PARTIAL_MATCH_CREDIT: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub semantic: f64,
    pub experience: f64,
    pub qualifications: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            semantic: 0.3,
            experience: 0.2,
            qualifications: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Weights must be non-negative and sum to 1.0; they are never renormalized
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("skills", self.skills),
            ("semantic", self.semantic),
            ("experience", self.experience),
            ("qualifications", self.qualifications),
        ];

        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ResumeMatcherError::Configuration(format!(
                    "Weight '{}' must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ResumeMatcherError::Configuration(format!(
                "Scoring weights must sum to 1.0, got {}",
                total
            )));
        }

        Ok(())
    }
}

/// Four sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill_score: f64,
    pub semantic_score: f64,
    pub experience_score: f64,
    pub qualification_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "Weak Match")]
    Weak,
    #[serde(rename = "Moderate Match")]
    Moderate,
    #[serde(rename = "Fair Match")]
    Fair,
    #[serde(rename = "Good Match")]
    Good,
    #[serde(rename = "Very Good Match")]
    VeryGood,
    #[serde(rename = "Excellent Match")]
    Excellent,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent Match",
            Rating::VeryGood => "Very Good Match",
            Rating::Good => "Good Match",
            Rating::Fair => "Fair Match",
            Rating::Moderate => "Moderate Match",
            Rating::Weak => "Weak Match",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct MatchScorer {
    weights: ScoringWeights,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Weighted sum of clamped sub-scores, clamped to [0, 100], one decimal
    pub fn calculate_final_score(&self, breakdown: &ScoreBreakdown) -> f64 {
        let clamp = |score: f64| score.clamp(0.0, 100.0);
        let w = &self.weights;

        let total = w.skills * clamp(breakdown.skill_score)
            + w.semantic * clamp(breakdown.semantic_score)
            + w.experience * clamp(breakdown.experience_score)
            + w.qualifications * clamp(breakdown.qualification_score);

        round1(total.clamp(0.0, 100.0))
    }

    /// No required skills means the requirement is trivially satisfied
    pub fn calculate_skill_match_score(
        exact_count: usize,
        required_count: usize,
        fuzzy_count: usize,
    ) -> f64 {
        if required_count == 0 {
            return 100.0;
        }

        let matched = exact_count as f64 + fuzzy_count as f64 * PARTIAL_MATCH_CREDIT;
        let rate = (matched / required_count as f64).min(1.0);
        round1(rate * 100.0)
    }

    pub fn calculate_semantic_score(similarity: f32) -> f64 {
        if !similarity.is_finite() {
            return 0.0;
        }
        round1((f64::from(similarity) * 100.0).clamp(0.0, 100.0))
    }

    /// Degree 40, certifications 30, experience up to 30
    pub fn calculate_qualification_score(
        has_degree: bool,
        has_certifications: bool,
        years: ExperienceYears,
    ) -> f64 {
        let mut score = 0.0;

        if has_degree {
            score += 40.0;
        }
        if has_certifications {
            score += 30.0;
        }

        score += match years.known().unwrap_or(0) {
            y if y >= 5 => 30.0,
            y if y >= 3 => 20.0,
            y if y >= 1 => 10.0,
            _ => 0.0,
        };

        score
    }

    pub fn get_rating(score: f64) -> Rating {
        if score >= 90.0 {
            Rating::Excellent
        } else if score >= 80.0 {
            Rating::VeryGood
        } else if score >= 70.0 {
            Rating::Good
        } else if score >= 60.0 {
            Rating::Fair
        } else if score >= 50.0 {
            Rating::Moderate
        } else {
            Rating::Weak
        }
    }
}
