//! Taxonomy-driven skill extraction and years-of-experience detection

use crate::error::{Result, ResumeMatcherError};
use crate::processing::taxonomy::SkillTaxonomy;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Category name to the skills found in one document
pub type ExtractedSkills = BTreeMap<String, Vec<String>>;

pub const OTHER_CATEGORY: &str = "other";

/// Years of experience as stated in a document.
///
/// `Known(0)` means the document explicitly states no experience;
/// `Unknown` means it says nothing. Serialized as an optional integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum ExperienceYears {
    Known(u32),
    #[default]
    Unknown,
}

impl ExperienceYears {
    pub fn known(self) -> Option<u32> {
        match self {
            ExperienceYears::Known(years) => Some(years),
            ExperienceYears::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, ExperienceYears::Known(_))
    }
}

impl From<Option<u32>> for ExperienceYears {
    fn from(value: Option<u32>) -> Self {
        value.map_or(ExperienceYears::Unknown, ExperienceYears::Known)
    }
}

impl From<ExperienceYears> for Option<u32> {
    fn from(value: ExperienceYears) -> Self {
        value.known()
    }
}

impl fmt::Display for ExperienceYears {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceYears::Known(1) => write!(f, "1 year"),
            ExperienceYears::Known(years) => write!(f, "{} years", years),
            ExperienceYears::Unknown => write!(f, "not stated"),
        }
    }
}

pub(crate) struct SkillPattern {
    pub category: String,
    pub skill: String,
    pub regex: Regex,
}

/// Compile a case-insensitive matcher that respects token boundaries.
/// Names starting or ending in punctuation (`C++`, `.NET`) cannot use `\b`
/// on that side, so a non-word neighbour or the text edge stands in.
/// Group 1 is the skill itself, without the neighbours.
pub(crate) fn skill_regex(skill: &str) -> Result<Regex> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let prefix = if skill.chars().next().is_some_and(is_word) {
        r"\b"
    } else {
        r"(?:^|[^\w])"
    };
    let suffix = if skill.chars().last().is_some_and(is_word) {
        r"\b"
    } else {
        r"(?:$|[^\w])"
    };
    let body = regex::escape(skill).replace(' ', r"\s+");

    Regex::new(&format!("(?i){}({}){}", prefix, body, suffix)).map_err(|e| {
        ResumeMatcherError::Taxonomy(format!("Cannot build matcher for skill '{}': {}", skill, e))
    })
}

pub(crate) fn compile_patterns(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                ResumeMatcherError::Configuration(format!("Invalid pattern '{}': {}", p, e))
            })
        })
        .collect()
}

/// Non-overlapping mentions of a [`skill_regex`] skill. Each search resumes
/// right after the skill name, so one delimiter can close a mention and
/// open the next ("C++ C++").
pub(crate) fn count_mentions(regex: &Regex, text: &str) -> usize {
    let mut count = 0;
    let mut start = 0;
    while let Some(skill) = regex.captures_at(text, start).and_then(|caps| caps.get(1)) {
        if skill.end() <= start {
            break;
        }
        count += 1;
        start = skill.end();
    }
    count
}

/// Every number captured by any of `patterns` in `text`
pub(crate) fn capture_years(patterns: &[Regex], text: &str) -> Vec<u32> {
    let lowered = text.to_lowercase();
    patterns
        .iter()
        .flat_map(|re| re.captures_iter(&lowered).collect::<Vec<_>>())
        .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .collect()
}

const EXPERIENCE_PATTERNS: &[&str] = &[
    r"(\d+)\+?\s*years?\s*(?:of)?\s*experience",
    r"experience[:\s]*(\d+)\+?\s*years?",
    r"(\d+)\+?\s*yrs?\s*(?:of)?\s*experience",
];

pub struct SkillExtractor {
    taxonomy: Arc<SkillTaxonomy>,
    patterns: Vec<SkillPattern>,
    experience_patterns: Vec<Regex>,
}

impl SkillExtractor {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Result<Self> {
        let mut patterns = Vec::with_capacity(taxonomy.skill_count());
        for (category, skills) in taxonomy.iter() {
            for skill in skills {
                patterns.push(SkillPattern {
                    category: category.to_string(),
                    skill: skill.clone(),
                    regex: skill_regex(skill)?,
                });
            }
        }

        debug!("Compiled {} skill matchers", patterns.len());

        Ok(Self {
            taxonomy,
            patterns,
            experience_patterns: compile_patterns(EXPERIENCE_PATTERNS)?,
        })
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    /// Every taxonomy skill mentioned in `text`, grouped by category
    pub fn extract(&self, text: &str) -> ExtractedSkills {
        let mut found = ExtractedSkills::new();
        if text.trim().is_empty() {
            return found;
        }

        for pattern in &self.patterns {
            if pattern.regex.is_match(text) {
                found
                    .entry(pattern.category.clone())
                    .or_default()
                    .push(pattern.skill.clone());
            }
        }

        found
    }

    /// Largest "N years of experience" figure stated in `text`
    pub fn extract_years_of_experience(&self, text: &str) -> ExperienceYears {
        capture_years(&self.experience_patterns, text)
            .into_iter()
            .max()
            .into()
    }

    /// Occurrence count per skill, restricted to `categories`
    pub(crate) fn mention_counts(&self, text: &str, categories: &[&str]) -> Vec<(String, usize)> {
        self.patterns
            .iter()
            .filter(|p| categories.contains(&p.category.as_str()))
            .filter_map(|p| {
                let count = count_mentions(&p.regex, text);
                (count > 0).then(|| (p.skill.clone(), count))
            })
            .collect()
    }

    /// Map arbitrary skill names back onto taxonomy categories
    pub fn categorize_skills(&self, skills: &[String]) -> ExtractedSkills {
        let mut categorized = ExtractedSkills::new();
        for skill in skills {
            let category = self.taxonomy.category_of(skill).unwrap_or(OTHER_CATEGORY);
            categorized
                .entry(category.to_string())
                .or_default()
                .push(skill.clone());
        }
        categorized
    }

    /// Distinct skills across categories, first spelling kept, category order
    pub fn flatten(extracted: &ExtractedSkills) -> Vec<String> {
        let mut seen = HashSet::new();
        extracted
            .values()
            .flatten()
            .filter(|skill| seen.insert(skill.trim().to_lowercase()))
            .cloned()
            .collect()
    }

    pub fn skill_count(extracted: &ExtractedSkills) -> usize {
        Self::flatten(extracted).len()
    }
}
