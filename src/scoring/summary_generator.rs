//! Report assembly: strengths, recommendations and summary from fixed rule tables

use crate::processing::jd_extractor::EducationLevel;
use crate::processing::similarity_matcher::{MatchResult, SkillPair};
use crate::processing::text_cleaner::ContactInfo;
use crate::scoring::experience_scorer::ExperienceGapAnalysis;
use crate::scoring::match_scorer::{MatchScorer, Rating, ScoreBreakdown};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ANALYZER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub job_title: String,
    pub analyzer_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub final_score: f64,
    pub rating: Rating,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsAnalysis {
    pub matched_exact: Vec<String>,
    pub matched_fuzzy: Vec<String>,
    pub matched_semantic: Vec<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub total_matched: usize,
    pub total_required: usize,
    pub match_rate: f64,
    pub fuzzy_pairs: Vec<SkillPair>,
    pub semantic_pairs: Vec<SkillPair>,
}

impl From<&MatchResult> for SkillsAnalysis {
    fn from(result: &MatchResult) -> Self {
        Self {
            matched_exact: result.matched_exact.clone(),
            matched_fuzzy: result.matched_fuzzy.clone(),
            matched_semantic: result.matched_semantic.clone(),
            missing: result.missing.clone(),
            extra: result.extra.clone(),
            total_matched: result.total_matched(),
            total_required: result.total_required(),
            match_rate: result.match_rate(),
            fuzzy_pairs: result.fuzzy_pairs.clone(),
            semantic_pairs: result.semantic_pairs.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub overall_similarity: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementsSummary {
    pub preferred_skills: Vec<String>,
    pub education_levels: Vec<EducationLevel>,
    pub key_technologies: Vec<String>,
}

/// One analysis, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub contact_info: ContactInfo,
    pub overall_score: OverallScore,
    pub skills_analysis: SkillsAnalysis,
    pub semantic_analysis: SemanticAnalysis,
    pub experience_analysis: ExperienceGapAnalysis,
    pub requirements: RequirementsSummary,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
    pub summary: String,
}

/// Everything the generator needs; all of it already computed
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub final_score: f64,
    pub breakdown: ScoreBreakdown,
    pub match_result: &'a MatchResult,
    pub semantic_similarity: f32,
    pub experience_analysis: ExperienceGapAnalysis,
    pub requirements: RequirementsSummary,
    pub contact_info: ContactInfo,
    pub job_title: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryGenerator;

impl SummaryGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic: identical input gives an identical report
    pub fn generate_report(&self, input: ReportInput<'_>) -> Report {
        let rating = MatchScorer::get_rating(input.final_score);
        let skills_analysis = SkillsAnalysis::from(input.match_result);

        let strengths = Self::identify_strengths(&input.breakdown, &skills_analysis);
        let recommendations = Self::generate_recommendations(
            input.final_score,
            &skills_analysis,
            &input.experience_analysis,
        );
        let summary = Self::generate_summary(
            input.final_score,
            rating,
            &skills_analysis,
            &input.experience_analysis,
        );

        let similarity = f64::from(input.semantic_similarity);

        Report {
            metadata: ReportMetadata {
                generated_at: input.generated_at,
                job_title: input
                    .job_title
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or("Not specified")
                    .to_string(),
                analyzer_version: ANALYZER_VERSION.to_string(),
            },
            contact_info: input.contact_info,
            overall_score: OverallScore {
                final_score: input.final_score,
                rating,
                breakdown: input.breakdown,
            },
            skills_analysis,
            semantic_analysis: SemanticAnalysis {
                overall_similarity: (similarity * 1000.0).round() / 1000.0,
                interpretation: Self::interpret_semantic_score(similarity).to_string(),
            },
            experience_analysis: input.experience_analysis,
            requirements: input.requirements,
            strengths,
            recommendations,
            summary,
        }
    }

    pub fn interpret_semantic_score(similarity: f64) -> &'static str {
        if similarity >= 0.8 {
            "Very high semantic alignment with job requirements"
        } else if similarity >= 0.7 {
            "High semantic alignment with job requirements"
        } else if similarity >= 0.6 {
            "Moderate semantic alignment with job requirements"
        } else if similarity >= 0.5 {
            "Fair semantic alignment with job requirements"
        } else {
            "Low semantic alignment with job requirements"
        }
    }

    fn similar_count(skills: &SkillsAnalysis) -> usize {
        skills.matched_fuzzy.len() + skills.matched_semantic.len()
    }

    fn identify_strengths(breakdown: &ScoreBreakdown, skills: &SkillsAnalysis) -> Vec<String> {
        let mut strengths = Vec::new();

        if breakdown.skill_score >= 80.0 {
            strengths.push(format!(
                "Strong skill match with {} exact and {} similar skill matches",
                skills.matched_exact.len(),
                Self::similar_count(skills)
            ));
        }

        if breakdown.semantic_score >= 80.0 {
            strengths.push("High semantic alignment with job requirements".to_string());
        }

        if breakdown.experience_score >= 90.0 {
            strengths.push("Experience level matches or exceeds requirements".to_string());
        }

        let notable_extra: Vec<&str> = skills
            .extra
            .iter()
            .filter(|s| s.chars().count() > 3)
            .take(3)
            .map(String::as_str)
            .collect();
        if !notable_extra.is_empty() {
            strengths.push(format!(
                "Additional relevant skills: {}",
                notable_extra.join(", ")
            ));
        }

        if !skills.matched_exact.is_empty() {
            strengths.push(format!(
                "Proficient in key required skills: {}",
                Self::first_n(&skills.matched_exact, 3)
            ));
        }

        strengths
    }

    fn generate_recommendations(
        final_score: f64,
        skills: &SkillsAnalysis,
        experience: &ExperienceGapAnalysis,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if final_score < 70.0 {
            recommendations
                .push("Consider acquiring key missing skills through courses or projects".to_string());
        }

        if !skills.missing.is_empty() {
            if skills.missing.len() <= 3 {
                recommendations.push(format!(
                    "Priority skills to acquire: {}",
                    Self::first_n(&skills.missing, 3)
                ));
            } else {
                recommendations.push(format!(
                    "Focus on top missing skills: {}",
                    Self::first_n(&skills.missing, 3)
                ));
            }
        }

        if experience.status.needs_attention() {
            recommendations.push(experience.recommendation.clone());
        }

        if skills.total_matched > 0 {
            recommendations.push(
                "Highlight your relevant skills and projects more prominently in your resume"
                    .to_string(),
            );
        }

        let closing = if final_score >= 80.0 {
            "Excellent match! Tailor your resume to emphasize relevant experience and projects"
        } else if final_score >= 70.0 {
            "Good match overall. Consider adding specific examples of projects using required skills"
        } else if final_score >= 60.0 {
            "Strengthen your profile by gaining hands-on experience with missing skills"
        } else {
            "Significant skill gaps identified. Consider targeted learning or look for roles that better match your current skill set"
        };
        recommendations.push(closing.to_string());

        recommendations
    }

    fn generate_summary(
        final_score: f64,
        rating: Rating,
        skills: &SkillsAnalysis,
        experience: &ExperienceGapAnalysis,
    ) -> String {
        let mut parts = vec![
            format!("Overall Assessment: {} ({:.1}/100)", rating, final_score),
            format!(
                "Skills: {} matched ({} exact, {} similar), {} missing",
                skills.total_matched,
                skills.matched_exact.len(),
                Self::similar_count(skills),
                skills.missing.len()
            ),
        ];

        if !experience.message.is_empty() {
            parts.push(format!("Experience: {}", experience.message));
        }

        let verdict = if final_score >= 80.0 {
            "Recommendation: Strong candidate. Proceed with application."
        } else if final_score >= 70.0 {
            "Recommendation: Good candidate. Consider applying with tailored resume."
        } else if final_score >= 60.0 {
            "Recommendation: Fair match. Consider skill development before applying."
        } else {
            "Recommendation: Address significant skill gaps or consider alternative positions."
        };
        parts.push(verdict.to_string());

        parts.join(" | ")
    }

    fn first_n(items: &[String], n: usize) -> String {
        items
            .iter()
            .take(n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
