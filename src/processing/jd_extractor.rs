//! Job description requirement extraction

use crate::error::Result;
use crate::processing::skill_extractor::{
    capture_years, compile_patterns, ExperienceYears, ExtractedSkills, SkillExtractor,
};
use crate::processing::taxonomy::{SkillTaxonomy, TECHNICAL_CATEGORIES};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const REQUIRED_HEADINGS: &[&str] = &["required", "must have", "requirements"];
const PREFERRED_HEADINGS: &[&str] = &["preferred", "nice to have", "bonus"];

const REQUIREMENT_PATTERNS: &[&str] = &[
    r"(\d+)\+?\s*years?\s*(?:of)?\s*experience",
    r"experience[:\s]*(\d+)\+?\s*years?",
    r"minimum\s*(\d+)\s*years?",
];

const KEY_TECHNOLOGY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Associate,
    Bachelors,
    Masters,
    Phd,
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EducationLevel::Associate => "Associate",
            EducationLevel::Bachelors => "Bachelors",
            EducationLevel::Masters => "Masters",
            EducationLevel::Phd => "PhD",
        };
        write!(f, "{}", label)
    }
}

/// Keyword detection of degree levels, shared by resume and job description
pub struct EducationDetector {
    patterns: Vec<(EducationLevel, Regex)>,
}

impl EducationDetector {
    pub fn new() -> Result<Self> {
        let levels = [
            (EducationLevel::Phd, r"\b(phd|ph\.d|doctorate|doctoral)\b"),
            (EducationLevel::Masters, r"\b(masters?|m\.s|msc|m\.sc|graduate degree)\b"),
            (EducationLevel::Bachelors, r"\b(bachelors?|b\.s|bsc|b\.sc|undergraduate degree)\b"),
            (EducationLevel::Associate, r"\b(associate|a\.s|asc)\b"),
        ];

        let regexes = compile_patterns(&levels.map(|(_, pattern)| pattern))?;
        let patterns = levels.iter().map(|(level, _)| *level).zip(regexes).collect();

        Ok(Self { patterns })
    }

    /// Levels mentioned in `text`, lowest first
    pub fn detect(&self, text: &str) -> Vec<EducationLevel> {
        let lowered = text.to_lowercase();
        let mut levels: Vec<EducationLevel> = self
            .patterns
            .iter()
            .filter(|(_, re)| re.is_match(&lowered))
            .map(|(level, _)| *level)
            .collect();
        levels.sort();
        levels
    }

    pub fn highest(&self, text: &str) -> Option<EducationLevel> {
        self.detect(text).into_iter().max()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceRequirement {
    pub min_years: ExperienceYears,
    pub max_years: ExperienceYears,
}

impl ExperienceRequirement {
    pub fn is_stated(&self) -> bool {
        self.min_years.is_known()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRequirement {
    pub levels: Vec<EducationLevel>,
}

impl EducationRequirement {
    pub fn is_stated(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Lowest level the posting accepts
    pub fn minimum(&self) -> Option<EducationLevel> {
        self.levels.iter().min().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub required_skills: ExtractedSkills,
    pub preferred_skills: ExtractedSkills,
    pub experience_requirement: ExperienceRequirement,
    pub education_requirement: EducationRequirement,
    pub total_required_skills: usize,
}

impl JobRequirements {
    pub fn required_skill_list(&self) -> Vec<String> {
        SkillExtractor::flatten(&self.required_skills)
    }

    pub fn preferred_skill_list(&self) -> Vec<String> {
        SkillExtractor::flatten(&self.preferred_skills)
    }
}

pub struct JdSkillExtractor {
    skills: SkillExtractor,
    education: EducationDetector,
    required_headings: Vec<Regex>,
    preferred_headings: Vec<Regex>,
    requirement_patterns: Vec<Regex>,
}

fn heading_patterns(keywords: &[&str]) -> Result<Vec<Regex>> {
    let patterns: Vec<String> = keywords
        .iter()
        .map(|k| format!(r"{}[:\s]+", regex::escape(k)))
        .collect();
    let refs: Vec<&str> = patterns.iter().map(String::as_str).collect();
    compile_patterns(&refs)
}

impl JdSkillExtractor {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Result<Self> {
        Ok(Self {
            skills: SkillExtractor::new(taxonomy)?,
            education: EducationDetector::new()?,
            required_headings: heading_patterns(REQUIRED_HEADINGS)?,
            preferred_headings: heading_patterns(PREFERRED_HEADINGS)?,
            requirement_patterns: compile_patterns(REQUIREMENT_PATTERNS)?,
        })
    }

    pub fn extract(&self, jd_text: &str) -> JobRequirements {
        let lowered = jd_text.to_lowercase();

        let required_section = Self::extract_section(&lowered, &self.required_headings);
        let preferred_section = Self::extract_section(&lowered, &self.preferred_headings);

        if required_section.is_none() {
            debug!("No required-skills heading found, scanning the whole description");
        }

        let required_skills = self.skills.extract(required_section.unwrap_or(&lowered));
        let preferred_skills = preferred_section
            .map(|section| self.skills.extract(section))
            .unwrap_or_default();

        let total_required_skills = SkillExtractor::skill_count(&required_skills);

        JobRequirements {
            required_skills,
            preferred_skills,
            experience_requirement: self.extract_experience_requirement(&lowered),
            education_requirement: EducationRequirement {
                levels: self.education.detect(&lowered),
            },
            total_required_skills,
        }
    }

    /// Text after the first matching heading, up to the next blank line
    fn extract_section<'a>(text: &'a str, headings: &[Regex]) -> Option<&'a str> {
        headings.iter().find_map(|heading| {
            let start = heading.find(text)?.end();
            let rest = &text[start..];
            let end = rest.find("\n\n").unwrap_or(rest.len());
            let section = rest[..end].trim();
            (!section.is_empty()).then_some(section)
        })
    }

    pub fn extract_experience_requirement(&self, text: &str) -> ExperienceRequirement {
        let years = capture_years(&self.requirement_patterns, text);
        ExperienceRequirement {
            min_years: years.iter().copied().min().into(),
            max_years: years.iter().copied().max().into(),
        }
    }

    /// Most frequently mentioned technologies, ties broken by name
    pub fn identify_key_technologies(&self, jd_text: &str) -> Vec<String> {
        let mut counts = self.skills.mention_counts(jd_text, TECHNICAL_CATEGORIES);
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
            .into_iter()
            .take(KEY_TECHNOLOGY_LIMIT)
            .map(|(skill, _)| skill)
            .collect()
    }

    pub fn education_detector(&self) -> &EducationDetector {
        &self.education
    }
}
