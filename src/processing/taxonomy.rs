//! Skill taxonomy: category name to canonical skill names
//!
//! Built once at startup (builtin table plus any JSON sources), then handed
//! to the extractors by reference and never mutated during an analysis.

use crate::error::{Result, ResumeMatcherError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Categories whose skills count as technologies for key-technology ranking
pub const TECHNICAL_CATEGORIES: &[&str] = &[
    "programming_languages",
    "web_technologies",
    "databases",
    "cloud_platforms",
];

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "programming_languages",
        &[
            "Python", "Java", "JavaScript", "TypeScript", "C++", "C#", "Rust", "Golang", "Ruby",
            "PHP", "Kotlin", "Swift", "Scala", "Perl", "Bash", "MATLAB",
        ],
    ),
    (
        "web_technologies",
        &[
            "React", "Angular", "Vue.js", "Node.js", "Express", "Django", "Flask", "FastAPI",
            "Spring Boot", "HTML", "CSS", "GraphQL", "REST", ".NET", "Next.js", "jQuery",
        ],
    ),
    (
        "databases",
        &[
            "SQL", "PostgreSQL", "MySQL", "SQLite", "MongoDB", "Redis", "Cassandra",
            "Elasticsearch", "DynamoDB", "Oracle", "SQL Server", "Snowflake",
        ],
    ),
    (
        "cloud_platforms",
        &["AWS", "Azure", "Google Cloud", "GCP", "Heroku", "DigitalOcean", "OpenStack"],
    ),
    (
        "devops_tools",
        &[
            "Docker", "Kubernetes", "Terraform", "Ansible", "Jenkins", "GitHub Actions",
            "GitLab CI", "CI/CD", "Git", "Linux", "Prometheus", "Grafana", "Helm",
        ],
    ),
    (
        "data_science",
        &[
            "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Pandas", "NumPy",
            "scikit-learn", "NLP", "Computer Vision", "Spark", "Hadoop", "Tableau", "Power BI",
            "Statistics", "Data Analysis",
        ],
    ),
    (
        "soft_skills",
        &[
            "Leadership", "Communication", "Teamwork", "Problem Solving", "Mentoring",
            "Collaboration", "Project Management", "Agile", "Scrum", "Critical Thinking",
        ],
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    categories: BTreeMap<String, Vec<String>>,
}

/// Accepted on-disk shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum TaxonomySource {
    Categorized(BTreeMap<String, Vec<String>>),
    Flat(Vec<String>),
}

impl SkillTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut taxonomy = Self::new();
        for (category, skills) in BUILTIN {
            taxonomy.add_skills(category, skills.iter().map(|s| s.to_string()));
        }
        taxonomy
    }

    pub fn from_categories(categories: BTreeMap<String, Vec<String>>) -> Self {
        let mut taxonomy = Self::new();
        for (category, skills) in categories {
            taxonomy.add_skills(&category, skills);
        }
        taxonomy
    }

    /// Parse `{category: [skills]}` or a flat `[skills]` list, which lands
    /// under `source_name`
    pub fn from_json_str(json: &str, source_name: &str) -> Result<Self> {
        let source: TaxonomySource = serde_json::from_str(json).map_err(|e| {
            ResumeMatcherError::Taxonomy(format!("Invalid taxonomy '{}': {}", source_name, e))
        })?;

        Ok(match source {
            TaxonomySource::Categorized(categories) => Self::from_categories(categories),
            TaxonomySource::Flat(skills) => {
                let mut taxonomy = Self::new();
                taxonomy.add_skills(source_name, skills);
                taxonomy
            }
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeMatcherError::Taxonomy(format!(
                "Failed to read taxonomy '{}': {}",
                path.display(),
                e
            ))
        })?;
        let source_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom");
        Self::from_json_str(&content, source_name)
    }

    /// Category-name union; within a category the first spelling of a skill wins
    pub fn merge(&mut self, other: &SkillTaxonomy) {
        for (category, skills) in &other.categories {
            self.add_skills(category, skills.iter().cloned());
        }
    }

    fn add_skills(&mut self, category: &str, skills: impl IntoIterator<Item = String>) {
        let category = category.trim();
        if category.is_empty() {
            return;
        }

        let entry = self.categories.entry(category.to_string()).or_default();
        let mut seen: HashSet<String> = entry.iter().map(|s| s.to_lowercase()).collect();

        for skill in skills {
            let skill = skill.trim();
            if skill.is_empty() {
                continue;
            }
            if seen.insert(skill.to_lowercase()) {
                entry.push(skill.to_string());
            }
        }

        if entry.is_empty() {
            self.categories.remove(category);
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn skills(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(category, skills)| (category.as_str(), skills.as_slice()))
    }

    /// Total skill entries across categories
    pub fn skill_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// First category (in name order) that lists `skill`, case-insensitively
    pub fn category_of(&self, skill: &str) -> Option<&str> {
        let needle = skill.trim().to_lowercase();
        self.categories
            .iter()
            .find(|(_, skills)| skills.iter().any(|s| s.to_lowercase() == needle))
            .map(|(category, _)| category.as_str())
    }
}
