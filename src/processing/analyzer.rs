//! Analysis pipeline: clean, extract, match, score, report

use crate::config::Config;
use crate::error::{Result, ResumeMatcherError};
use crate::processing::embeddings::{CacheStats, EmbeddingEngine};
use crate::processing::jd_extractor::{EducationLevel, JdSkillExtractor, JobRequirements};
use crate::processing::similarity_matcher::{MatchResult, SimilarityMatcher};
use crate::processing::skill_extractor::{ExperienceYears, ExtractedSkills, SkillExtractor};
use crate::processing::taxonomy::SkillTaxonomy;
use crate::processing::text_cleaner::{truncate_for_embedding, TextCleaner};
use crate::scoring::{
    ExperienceScorer, MatchScorer, Report, ReportInput, ScoreBreakdown, SummaryGenerator,
};
use crate::scoring::summary_generator::RequirementsSummary;
use chrono::{DateTime, Utc};
use log::{debug, info};
use regex::Regex;
use std::sync::Arc;

/// Skills and signals pulled out of a single resume
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeProfile {
    pub skills: ExtractedSkills,
    pub years_of_experience: ExperienceYears,
    pub education: Option<EducationLevel>,
    pub has_certifications: bool,
}

impl ResumeProfile {
    pub fn skill_list(&self) -> Vec<String> {
        SkillExtractor::flatten(&self.skills)
    }
}

pub struct ResumeAnalyzer {
    cleaner: TextCleaner,
    skill_extractor: SkillExtractor,
    jd_extractor: JdSkillExtractor,
    matcher: SimilarityMatcher,
    experience_scorer: ExperienceScorer,
    match_scorer: MatchScorer,
    summary_generator: SummaryGenerator,
    embeddings: EmbeddingEngine,
    certification_pattern: Regex,
    semantic_skill_matching: bool,
    max_embedding_chars: usize,
}

impl ResumeAnalyzer {
    /// Fails only on invalid scoring weights or an unusable taxonomy
    pub fn new(
        config: &Config,
        taxonomy: Arc<SkillTaxonomy>,
        embeddings: EmbeddingEngine,
    ) -> Result<Self> {
        Ok(Self {
            cleaner: TextCleaner::new(
                config.extraction.lowercase,
                config.extraction.remove_stopwords,
            ),
            skill_extractor: SkillExtractor::new(Arc::clone(&taxonomy))?,
            jd_extractor: JdSkillExtractor::new(taxonomy)?,
            matcher: SimilarityMatcher::new(
                config.matching.fuzzy_threshold,
                config.matching.semantic_threshold,
            ),
            experience_scorer: ExperienceScorer::new(),
            match_scorer: MatchScorer::new(config.scoring.weights)?,
            summary_generator: SummaryGenerator::new(),
            embeddings,
            certification_pattern: Regex::new(r"(?i)\bcertif(?:ied|ication|icate)")
                .expect("Invalid certification regex"),
            semantic_skill_matching: config.matching.semantic_skill_matching,
            max_embedding_chars: config.extraction.max_embedding_chars,
        })
    }

    pub fn analyze(
        &mut self,
        resume_text: &str,
        jd_text: &str,
        job_title: Option<&str>,
    ) -> Result<Report> {
        self.analyze_at(resume_text, jd_text, job_title, Utc::now())
    }

    /// Same as `analyze` with a caller-supplied timestamp
    pub fn analyze_at(
        &mut self,
        resume_text: &str,
        jd_text: &str,
        job_title: Option<&str>,
        generated_at: DateTime<Utc>,
    ) -> Result<Report> {
        if resume_text.trim().is_empty() {
            return Err(ResumeMatcherError::InvalidInput(
                "Resume text is empty".to_string(),
            ));
        }

        info!("Cleaning resume and job description");
        let contact_info = self.cleaner.extract_contact_info(resume_text);
        let resume_clean = self.cleaner.clean(resume_text);
        let jd_clean = self.cleaner.clean(jd_text);

        info!("Extracting skills and requirements");
        let profile = self.profile_cleaned(&resume_clean);
        let requirements = self.jd_extractor.extract(&jd_clean);
        let key_technologies = self.jd_extractor.identify_key_technologies(&jd_clean);
        debug!(
            "Resume: {} skills, experience {}; job: {} required skills, experience {}",
            SkillExtractor::skill_count(&profile.skills),
            profile.years_of_experience,
            requirements.total_required_skills,
            requirements.experience_requirement.min_years
        );

        info!("Matching skills");
        let match_result = self.match_skills(&profile, &requirements);

        info!("Computing semantic similarity with {}", self.embeddings.model_name());
        let semantic_similarity = self.embeddings.calculate_similarity(
            &truncate_for_embedding(&resume_clean, self.max_embedding_chars),
            &truncate_for_embedding(&jd_clean, self.max_embedding_chars),
        );

        info!("Scoring");
        let required_years = requirements.experience_requirement.min_years;
        let breakdown = ScoreBreakdown {
            skill_score: MatchScorer::calculate_skill_match_score(
                match_result.matched_exact.len(),
                match_result.total_required(),
                match_result.matched_fuzzy.len() + match_result.matched_semantic.len(),
            ),
            semantic_score: MatchScorer::calculate_semantic_score(semantic_similarity),
            experience_score: self
                .experience_scorer
                .calculate_experience_score(profile.years_of_experience, required_years),
            qualification_score: MatchScorer::calculate_qualification_score(
                Self::meets_education(&profile, &requirements),
                profile.has_certifications,
                profile.years_of_experience,
            ),
        };
        let final_score = self.match_scorer.calculate_final_score(&breakdown);
        let experience_analysis = self
            .experience_scorer
            .analyze_experience_gap(profile.years_of_experience, required_years);

        info!("Final score {:.1}", final_score);

        Ok(self.summary_generator.generate_report(ReportInput {
            final_score,
            breakdown,
            match_result: &match_result,
            semantic_similarity,
            experience_analysis,
            requirements: RequirementsSummary {
                preferred_skills: requirements.preferred_skill_list(),
                education_levels: requirements.education_requirement.levels.clone(),
                key_technologies,
            },
            contact_info,
            job_title,
            generated_at,
        }))
    }

    /// Skills, experience and qualifications found in a resume
    pub fn profile(&self, resume_text: &str) -> ResumeProfile {
        self.profile_cleaned(&self.cleaner.clean(resume_text))
    }

    pub fn job_requirements(&self, jd_text: &str) -> JobRequirements {
        self.jd_extractor.extract(&self.cleaner.clean(jd_text))
    }

    pub fn embedding_stats(&self) -> CacheStats {
        self.embeddings.cache_stats()
    }

    fn profile_cleaned(&self, cleaned: &str) -> ResumeProfile {
        ResumeProfile {
            skills: self.skill_extractor.extract(cleaned),
            years_of_experience: self.skill_extractor.extract_years_of_experience(cleaned),
            education: self
                .jd_extractor
                .education_detector()
                .highest(&cleaned.to_lowercase()),
            has_certifications: self.certification_pattern.is_match(cleaned),
        }
    }

    fn match_skills(&mut self, profile: &ResumeProfile, requirements: &JobRequirements) -> MatchResult {
        let candidate = profile.skill_list();
        let required = requirements.required_skill_list();

        if self.semantic_skill_matching {
            self.matcher
                .match_skills_with_embeddings(&candidate, &required, &mut self.embeddings)
        } else {
            self.matcher
                .match_skills(&candidate, &required, self.matcher.fuzzy_threshold())
        }
    }

    /// With no stated level any degree counts
    fn meets_education(profile: &ResumeProfile, requirements: &JobRequirements) -> bool {
        match (profile.education, requirements.education_requirement.minimum()) {
            (Some(candidate), Some(required)) => candidate >= required,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::TextEmbedder;
    use crate::scoring::{GapStatus, Rating};
    use chrono::TimeZone;

    struct ConstantEmbedder;

    impl TextEmbedder for ConstantEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn model_name(&self) -> &str {
            "constant"
        }
    }

    fn analyzer(engine: EmbeddingEngine) -> ResumeAnalyzer {
        ResumeAnalyzer::new(&Config::default(), Arc::new(SkillTaxonomy::builtin()), engine)
            .unwrap()
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_reference_analysis() {
        let mut analyzer = analyzer(EmbeddingEngine::new(Box::new(ConstantEmbedder)));
        let report = analyzer
            .analyze_at(
                "5 years experience in Python and SQL",
                "Requirements: Python, SQL, AWS. 5+ years of experience.",
                Some("Data Engineer"),
                timestamp(),
            )
            .unwrap();

        let scores = &report.overall_score;
        assert_eq!(scores.breakdown.skill_score, 66.7);
        assert_eq!(scores.breakdown.semantic_score, 100.0);
        assert_eq!(scores.breakdown.experience_score, 100.0);
        assert_eq!(scores.breakdown.qualification_score, 30.0);
        assert_eq!(scores.final_score, 79.7);
        assert_eq!(scores.rating, Rating::Good);

        assert_eq!(report.skills_analysis.matched_exact, ["Python", "SQL"]);
        assert_eq!(report.skills_analysis.missing, ["AWS"]);
        assert_eq!(report.experience_analysis.status, GapStatus::MeetsRequirement);
        assert_eq!(report.metadata.generated_at, timestamp());
    }

    #[test]
    fn test_disabled_embeddings_degrade_to_zero() {
        let mut analyzer = analyzer(EmbeddingEngine::disabled("test"));
        let report = analyzer
            .analyze_at(
                "5 years experience in Python and SQL",
                "Requirements: Python, SQL, AWS. 5+ years of experience.",
                None,
                timestamp(),
            )
            .unwrap();

        assert_eq!(report.overall_score.breakdown.semantic_score, 0.0);
        assert!(report.skills_analysis.matched_semantic.is_empty());
        assert_eq!(report.overall_score.final_score, 49.7);
        assert_eq!(report.metadata.job_title, "Not specified");
    }

    #[test]
    fn test_empty_resume_is_rejected() {
        let mut analyzer = analyzer(EmbeddingEngine::disabled("test"));
        let result = analyzer.analyze("   \n", "Requirements: Python", None);
        assert!(matches!(result, Err(ResumeMatcherError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_job_description_is_vacuously_satisfied() {
        let mut analyzer = analyzer(EmbeddingEngine::disabled("test"));
        let report = analyzer
            .analyze_at("Rust developer with 3 years of experience", "", None, timestamp())
            .unwrap();

        assert_eq!(report.skills_analysis.total_required, 0);
        assert_eq!(report.overall_score.breakdown.skill_score, 100.0);
        assert_eq!(report.experience_analysis.status, GapStatus::NoRequirement);
        assert_eq!(report.skills_analysis.extra, ["Rust"]);
    }

    #[test]
    fn test_profile_detects_qualifications() {
        let analyzer = analyzer(EmbeddingEngine::disabled("test"));
        let profile = analyzer.profile(
            "M.S. in Computer Science. AWS Certified Solutions Architect. 7 years of experience with Docker.",
        );

        assert_eq!(profile.years_of_experience, ExperienceYears::Known(7));
        assert!(profile.has_certifications);
        assert!(profile.skill_list().contains(&"Docker".to_string()));
    }

    #[test]
    fn test_education_requirement() {
        let profile = |education| ResumeProfile {
            skills: ExtractedSkills::new(),
            years_of_experience: ExperienceYears::Unknown,
            education,
            has_certifications: false,
        };
        let requirements = |levels: Vec<EducationLevel>| JobRequirements {
            education_requirement: crate::processing::jd_extractor::EducationRequirement { levels },
            ..JobRequirements::default()
        };

        assert!(ResumeAnalyzer::meets_education(
            &profile(Some(EducationLevel::Masters)),
            &requirements(vec![EducationLevel::Bachelors, EducationLevel::Masters])
        ));
        assert!(!ResumeAnalyzer::meets_education(
            &profile(Some(EducationLevel::Associate)),
            &requirements(vec![EducationLevel::Bachelors])
        ));
        assert!(ResumeAnalyzer::meets_education(
            &profile(Some(EducationLevel::Bachelors)),
            &requirements(vec![])
        ));
        assert!(!ResumeAnalyzer::meets_education(&profile(None), &requirements(vec![])));
    }
}
