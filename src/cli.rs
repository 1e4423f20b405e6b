//! Command-line interface definitions

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "text", "md", "markdown"];

#[derive(Parser)]
#[command(name = "resume-matcher")]
#[command(version)]
#[command(about = "Match resumes against job descriptions")]
#[command(
    long_about = "Score how well a resume fits a job description using exact, fuzzy and semantic skill matching, experience gap analysis and weighted scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one resume against a job description
    Analyze {
        /// Path to resume file (PDF, DOCX, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file
        #[arg(short, long)]
        job: PathBuf,

        /// Job title shown in the report
        #[arg(short, long)]
        title: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Include matched pairs and job requirements in console output
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file (a directory gets a suggested file name)
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Extra skill taxonomy JSON files
        #[arg(long = "taxonomy")]
        taxonomy: Vec<PathBuf>,

        /// Skip the embedding model (exact and fuzzy matching only)
        #[arg(long)]
        no_embeddings: bool,

        /// Fuzzy match threshold, 0-100
        #[arg(long, value_parser = parse_fuzzy_threshold)]
        fuzzy_threshold: Option<f64>,
    },

    /// Rank several resumes against one job description
    Rank {
        /// Path to job description file
        #[arg(short, long)]
        job: PathBuf,

        /// Resume files to rank
        #[arg(required = true)]
        resumes: Vec<PathBuf>,

        /// Extra skill taxonomy JSON files
        #[arg(long = "taxonomy")]
        taxonomy: Vec<PathBuf>,

        /// Skip the embedding model
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Show skills and experience found in a document
    Skills {
        /// Document to scan
        file: PathBuf,

        /// Extra skill taxonomy JSON files
        #[arg(long = "taxonomy")]
        taxonomy: Vec<PathBuf>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "matching.fuzzy_threshold")
        key: String,

        /// Configuration value
        value: String,
    },
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

fn parse_fuzzy_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("Fuzzy threshold must be between 0 and 100, got {}", threshold))
    }
}

pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "resume-matcher",
            "analyze",
            "--resume",
            "cv.pdf",
            "--job",
            "job.txt",
            "--fuzzy-threshold",
            "90",
            "--taxonomy",
            "a.json",
            "--taxonomy",
            "b.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                fuzzy_threshold,
                taxonomy,
                no_embeddings,
                ..
            } => {
                assert_eq!(fuzzy_threshold, Some(90.0));
                assert_eq!(taxonomy.len(), 2);
                assert!(!no_embeddings);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let result = Cli::try_parse_from([
            "resume-matcher",
            "analyze",
            "-r",
            "cv.pdf",
            "-j",
            "job.txt",
            "--fuzzy-threshold",
            "120",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_and_extensions() {
        assert_eq!(parse_output_format("MD").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("html").is_err());
        assert!(validate_file_extension(Path::new("cv.DOCX"), SUPPORTED_EXTENSIONS).is_ok());
        assert!(validate_file_extension(Path::new("cv.rtf"), SUPPORTED_EXTENSIONS).is_err());
        assert!(validate_file_extension(Path::new("cv"), SUPPORTED_EXTENSIONS).is_err());
    }
}
