//! Text processing: cleaning, extraction, matching and the analysis pipeline

pub mod analyzer;
pub mod embeddings;
pub mod jd_extractor;
pub mod similarity_matcher;
pub mod skill_extractor;
pub mod taxonomy;
pub mod text_cleaner;

pub use analyzer::{ResumeAnalyzer, ResumeProfile};
pub use embeddings::{EmbeddingEngine, TextEmbedder};
pub use taxonomy::SkillTaxonomy;
