//! Configuration management for the resume matcher

use crate::error::{Result, ResumeMatcherError};
use crate::scoring::match_scorer::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub extraction: ExtractionConfig,
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
    pub taxonomy: TaxonomyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Model2Vec repo id, or a directory name under `models_dir`
    pub embedding_model: String,
    pub enable_embeddings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    /// Documents shorter than this (after trimming) are rejected
    pub min_text_length: usize,
    pub max_embedding_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// 0-100
    pub fuzzy_threshold: f64,
    /// 0-1
    pub semantic_threshold: f32,
    pub semantic_skill_matching: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub include_builtin: bool,
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "minishlab/potion-base-8M".to_string(),
                enable_embeddings: true,
            },
            extraction: ExtractionConfig {
                lowercase: false,
                remove_stopwords: false,
                min_text_length: 50,
                max_embedding_chars: 5000,
            },
            matching: MatchingConfig {
                fuzzy_threshold: 85.0,
                semantic_threshold: 0.7,
                semantic_skill_matching: true,
            },
            scoring: ScoringConfig {
                weights: ScoringWeights::default(),
            },
            taxonomy: TaxonomyConfig {
                include_builtin: true,
                sources: Vec::new(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a config file at an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            ResumeMatcherError::Configuration(format!(
                "Failed to parse config '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeMatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    /// Reject inconsistent settings eagerly; nothing is renormalized
    pub fn validate(&self) -> Result<()> {
        self.scoring.weights.validate()?;

        if !(0.0..=100.0).contains(&self.matching.fuzzy_threshold) {
            return Err(ResumeMatcherError::Configuration(format!(
                "matching.fuzzy_threshold must be within 0-100, got {}",
                self.matching.fuzzy_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.matching.semantic_threshold) {
            return Err(ResumeMatcherError::Configuration(format!(
                "matching.semantic_threshold must be within 0-1, got {}",
                self.matching.semantic_threshold
            )));
        }

        Ok(())
    }

    /// Set a scalar value by dotted key, then re-validate
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value.parse::<T>().map_err(|_| {
                ResumeMatcherError::Configuration(format!("Invalid value for {}: {}", key, value))
            })
        }

        match key {
            "models.embedding_model" => self.models.embedding_model = value.to_string(),
            "models.models_dir" => self.models.models_dir = PathBuf::from(value),
            "models.enable_embeddings" => self.models.enable_embeddings = parse(key, value)?,
            "extraction.lowercase" => self.extraction.lowercase = parse(key, value)?,
            "extraction.remove_stopwords" => self.extraction.remove_stopwords = parse(key, value)?,
            "extraction.min_text_length" => self.extraction.min_text_length = parse(key, value)?,
            "extraction.max_embedding_chars" => {
                self.extraction.max_embedding_chars = parse(key, value)?
            }
            "matching.fuzzy_threshold" => self.matching.fuzzy_threshold = parse(key, value)?,
            "matching.semantic_threshold" => self.matching.semantic_threshold = parse(key, value)?,
            "matching.semantic_skill_matching" => {
                self.matching.semantic_skill_matching = parse(key, value)?
            }
            "scoring.weights.skills" => self.scoring.weights.skills = parse(key, value)?,
            "scoring.weights.semantic" => self.scoring.weights.semantic = parse(key, value)?,
            "scoring.weights.experience" => self.scoring.weights.experience = parse(key, value)?,
            "scoring.weights.qualifications" => {
                self.scoring.weights.qualifications = parse(key, value)?
            }
            "taxonomy.include_builtin" => self.taxonomy.include_builtin = parse(key, value)?,
            "output.detailed" => self.output.detailed = parse(key, value)?,
            "output.color_output" => self.output.color_output = parse(key, value)?,
            _ => {
                return Err(ResumeMatcherError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }

        self.validate()
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
