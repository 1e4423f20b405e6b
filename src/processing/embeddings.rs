//! Sentence embeddings and semantic similarity
//!
//! The model sits behind [`TextEmbedder`] so the matching core can run with a
//! deterministic stub. A failed embedding is a missing signal, never an
//! error for the caller: similarity degrades to 0 and skills stay unmatched.

use crate::config::Config;
use crate::error::{Result, ResumeMatcherError};
use crate::processing::similarity_matcher::SkillPair;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub trait TextEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    fn model_name(&self) -> &str;
}

/// Cosine similarity; 0 for empty, mismatched or zero-norm vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEmbedder {
    /// `model` is a directory under `models_dir`, a local path, or a Hugging Face repo id
    pub fn load(model: &str, models_dir: &Path) -> Result<Self> {
        let start_time = Instant::now();
        let source = Self::resolve_source(model, models_dir);
        info!("Loading Model2Vec embedding model from: {}", source.display());

        let static_model = StaticModel::from_pretrained(&source, None, None, None).map_err(|e| {
            ResumeMatcherError::Embedding(format!("Failed to load model '{}': {}", model, e))
        })?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model: static_model,
            model_name: model.to_string(),
        })
    }

    fn resolve_source(model: &str, models_dir: &Path) -> PathBuf {
        let local_path = models_dir.join(model);
        if local_path.exists() {
            local_path
        } else {
            PathBuf::from(model)
        }
    }
}

impl TextEmbedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(ResumeMatcherError::Embedding(
                "Model returned an empty embedding".to_string(),
            ));
        }
        Ok(embedding)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Stand-in when embeddings are disabled or the model could not be loaded
pub struct NullEmbedder {
    reason: String,
}

impl NullEmbedder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl TextEmbedder for NullEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(ResumeMatcherError::Embedding(self.reason.clone()))
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

/// Outcome of greedy one-to-one semantic assignment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticMatch {
    pub pairs: Vec<SkillPair>,
    pub unmatched_required: Vec<String>,
    pub unmatched_candidate: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub failures: usize,
    pub model_name: String,
}

/// Longer texts (whole documents) are embedded but not cached
pub const MAX_CACHED_TEXT_LEN: usize = 256;

pub struct EmbeddingEngine {
    backend: Box<dyn TextEmbedder>,
    cache: HashMap<String, Vec<f32>>,
    cache_hits: usize,
    cache_misses: usize,
    failures: usize,
}

impl EmbeddingEngine {
    pub fn new(backend: Box<dyn TextEmbedder>) -> Self {
        Self {
            backend,
            cache: HashMap::new(),
            cache_hits: 0,
            cache_misses: 0,
            failures: 0,
        }
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        Self::new(Box::new(NullEmbedder::new(reason)))
    }

    /// Load the configured Model2Vec model, or a disabled engine if turned off
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.models.enable_embeddings {
            return Ok(Self::disabled("Embeddings are disabled in configuration"));
        }

        let embedder =
            Model2VecEmbedder::load(&config.models.embedding_model, config.models_dir())?;
        Ok(Self::new(Box::new(embedder)))
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Embedding of the trimmed text, cached when at most [`MAX_CACHED_TEXT_LEN`]
    /// bytes; `None` when empty or on failure
    pub fn embed(&mut self, text: &str) -> Option<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(cached) = self.cache.get(text) {
            self.cache_hits += 1;
            return Some(cached.clone());
        }

        self.cache_misses += 1;
        match self.backend.embed(text) {
            Ok(embedding) if !embedding.is_empty() => {
                if text.len() <= MAX_CACHED_TEXT_LEN {
                    self.cache.insert(text.to_string(), embedding.clone());
                }
                Some(embedding)
            }
            Ok(_) => {
                self.failures += 1;
                None
            }
            Err(e) => {
                self.failures += 1;
                debug!("Embedding unavailable: {}", e);
                None
            }
        }
    }

    /// Semantic similarity of two texts in [0, 1]
    pub fn calculate_similarity(&mut self, text_a: &str, text_b: &str) -> f32 {
        let (Some(a), Some(b)) = (self.embed(text_a), self.embed(text_b)) else {
            return 0.0;
        };
        self.backend.similarity(&a, &b).clamp(0.0, 1.0)
    }

    /// For each required skill in order, take the most similar unused
    /// candidate at or above `threshold`; the first candidate wins ties.
    pub fn semantic_skill_match(
        &mut self,
        candidate_skills: &[String],
        required_skills: &[String],
        threshold: f32,
    ) -> SemanticMatch {
        let candidate_embeddings: Vec<Option<Vec<f32>>> =
            candidate_skills.iter().map(|s| self.embed(s)).collect();
        let mut used = vec![false; candidate_skills.len()];
        let mut result = SemanticMatch::default();

        for required in required_skills {
            let Some(required_embedding) = self.embed(required) else {
                result.unmatched_required.push(required.clone());
                continue;
            };

            let mut best: Option<(usize, f32)> = None;
            for (idx, candidate_embedding) in candidate_embeddings.iter().enumerate() {
                let Some(candidate_embedding) = candidate_embedding else {
                    continue;
                };
                if used[idx] {
                    continue;
                }
                let score = self.backend.similarity(&required_embedding, candidate_embedding);
                if score >= threshold && best.map_or(true, |(_, b)| score > b) {
                    best = Some((idx, score));
                }
            }

            match best {
                Some((idx, score)) => {
                    used[idx] = true;
                    result.pairs.push(SkillPair {
                        required: required.clone(),
                        candidate: candidate_skills[idx].clone(),
                        score: f64::from(score),
                    });
                }
                None => result.unmatched_required.push(required.clone()),
            }
        }

        result.unmatched_candidate = candidate_skills
            .iter()
            .zip(used)
            .filter(|(_, used)| !used)
            .map(|(skill, _)| skill.clone())
            .collect();

        result
    }

    /// Pairwise similarity matrix (`texts_a` rows by `texts_b` columns), 0 where embedding fails
    pub fn batch_similarity(&mut self, texts_a: &[String], texts_b: &[String]) -> Vec<Vec<f32>> {
        let embeddings_b: Vec<Option<Vec<f32>>> = texts_b.iter().map(|t| self.embed(t)).collect();

        let mut matrix = Vec::with_capacity(texts_a.len());
        for text in texts_a {
            let embedding_a = self.embed(text);
            let row = embeddings_b
                .iter()
                .map(|embedding_b| match (&embedding_a, embedding_b) {
                    (Some(a), Some(b)) => self.backend.similarity(a, b),
                    _ => 0.0,
                })
                .collect();
            matrix.push(row);
        }
        matrix
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            cache_size: self.cache.len(),
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            failures: self.failures,
            model_name: self.backend.model_name().to_string(),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maps known words to fixed axes; anything else fails to embed
    struct AxisEmbedder;

    impl TextEmbedder for AxisEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            match text.to_lowercase().as_str() {
                "machine learning" => Ok(vec![1.0, 0.0, 0.0]),
                "deep learning" => Ok(vec![0.9, 0.1, 0.0]),
                "tensorflow" => Ok(vec![0.8, 0.2, 0.0]),
                "kubernetes" => Ok(vec![0.0, 1.0, 0.0]),
                "cooking" => Ok(vec![0.0, 0.0, 1.0]),
                "zeros" => Ok(vec![0.0, 0.0, 0.0]),
                t if t.starts_with("document") => Ok(vec![0.5, 0.5, 0.0]),
                _ => Err(ResumeMatcherError::Embedding(format!("no vector for {}", text))),
            }
        }

        fn model_name(&self) -> &str {
            "axis"
        }
    }

    fn engine() -> EmbeddingEngine {
        EmbeddingEngine::new(Box::new(AxisEmbedder))
    }

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cosine_similarity_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_calculate_similarity_degrades_to_zero() {
        let mut engine = engine();
        assert_eq!(engine.calculate_similarity("", "cooking"), 0.0);
        assert_eq!(engine.calculate_similarity("unknown text", "cooking"), 0.0);
        assert_eq!(engine.calculate_similarity("zeros", "cooking"), 0.0);
        assert!((engine.calculate_similarity("Machine Learning", "machine learning") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_semantic_skill_match_is_greedy_one_to_one() {
        let mut engine = engine();
        let result = engine.semantic_skill_match(
            &skills(&["Deep Learning", "TensorFlow", "Cooking"]),
            &skills(&["Machine Learning", "Kubernetes"]),
            0.7,
        );

        assert_eq!(result.pairs.len(), 1);
        assert_eq!(result.pairs[0].required, "Machine Learning");
        assert_eq!(result.pairs[0].candidate, "Deep Learning");
        assert_eq!(result.unmatched_required, ["Kubernetes"]);
        assert_eq!(result.unmatched_candidate, ["TensorFlow", "Cooking"]);
    }

    #[test]
    fn test_unembeddable_skills_stay_unmatched() {
        let mut engine = engine();
        let result = engine.semantic_skill_match(
            &skills(&["Mystery Tool", "Deep Learning"]),
            &skills(&["Another Mystery", "Machine Learning"]),
            0.7,
        );
        assert_eq!(result.unmatched_required, ["Another Mystery"]);
        assert_eq!(result.unmatched_candidate, ["Mystery Tool"]);
        assert_eq!(result.pairs[0].candidate, "Deep Learning");
    }

    #[test]
    fn test_null_embedder_yields_no_matches() {
        let mut engine = EmbeddingEngine::disabled("off");
        assert_eq!(engine.calculate_similarity("a", "b"), 0.0);
        let result = engine.semantic_skill_match(&skills(&["Rust"]), &skills(&["Go"]), 0.1);
        assert!(result.pairs.is_empty());
        assert_eq!(engine.model_name(), "none");
    }

    #[test]
    fn test_cache_and_batch_similarity() {
        let mut engine = engine();
        let matrix = engine.batch_similarity(
            &skills(&["machine learning", "nothing"]),
            &skills(&["machine learning", "kubernetes"]),
        );
        assert_eq!(matrix.len(), 2);
        assert!((matrix[0][0] - 1.0).abs() < 1e-6);
        assert_eq!(matrix[0][1], 0.0);
        assert_eq!(matrix[1], [0.0, 0.0]);

        let stats = engine.cache_stats();
        assert_eq!(stats.cache_size, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.failures, 1);

        engine.clear_cache();
        assert_eq!(engine.cache_stats().cache_size, 0);
    }

    #[test]
    fn test_long_texts_are_not_cached() {
        let mut engine = engine();
        let document = format!("document {}", "python ".repeat(100));
        assert!(document.len() > MAX_CACHED_TEXT_LEN);

        assert!(engine.embed(&document).is_some());
        assert!(engine.embed(&document).is_some());
        assert!(engine.embed("kubernetes").is_some());

        let stats = engine.cache_stats();
        assert_eq!(stats.cache_size, 1);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.cache_misses, 3);
    }
}
