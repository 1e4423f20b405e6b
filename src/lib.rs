//! Resume matcher library: skill extraction, multi-tier matching and weighted scoring

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;
pub mod scoring;

pub use config::Config;
pub use error::{Result, ResumeMatcherError};
pub use processing::ResumeAnalyzer;
pub use scoring::Report;
