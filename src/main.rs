//! resume-matcher: score resumes against job descriptions

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_matcher::cli::{self, Cli, Commands, ConfigAction};
use resume_matcher::input::InputManager;
use resume_matcher::output::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_matcher::processing::skill_extractor::SkillExtractor;
use resume_matcher::processing::{EmbeddingEngine, ResumeAnalyzer, SkillTaxonomy};
use resume_matcher::{Config, Result, ResumeMatcherError};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from(path),
        Some(path) => {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
        None => Config::load(),
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            title,
            output,
            detailed,
            save,
            taxonomy,
            no_embeddings,
            fuzzy_threshold,
        } => {
            check_extension(&resume, "Resume file")?;
            check_extension(&job, "Job description file")?;

            let output_format = match output {
                Some(format) => {
                    cli::parse_output_format(&format).map_err(ResumeMatcherError::InvalidInput)?
                }
                None => config.output.format,
            };

            if let Some(threshold) = fuzzy_threshold {
                config.matching.fuzzy_threshold = threshold;
            }

            let mut input_manager = input_manager(&config);
            let resume_text = input_manager.extract_text(&resume).await?;
            let job_text = input_manager.extract_text(&job).await?;

            let mut analyzer = build_analyzer(&config, &taxonomy, no_embeddings)?;
            info!("Analyzing {} against {}", resume.display(), job.display());
            let report = analyzer.analyze(&resume_text, &job_text, title.as_deref())?;

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
                true,
            );
            let rendered = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(
                            &output_format,
                            &resume.to_string_lossy(),
                            true,
                        ))
                    } else {
                        path
                    };
                    save_report_to_file(&rendered, &path)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Rank {
            job,
            resumes,
            taxonomy,
            no_embeddings,
        } => {
            check_extension(&job, "Job description file")?;

            let mut input_manager = input_manager(&config);
            let job_text = input_manager.extract_text(&job).await?;
            let mut analyzer = build_analyzer(&config, &taxonomy, no_embeddings)?;

            let progress = ProgressBar::new(resumes.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let mut ranked = Vec::with_capacity(resumes.len());
            for resume in &resumes {
                let name = resume
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| resume.display().to_string());
                progress.set_message(name.clone());

                // Unreadable resumes are skipped with a warning
                let outcome = match check_extension(resume, "Resume file") {
                    Ok(()) => match input_manager.extract_text(resume).await {
                        Ok(text) => analyzer.analyze(&text, &job_text, None),
                        Err(e) => Err(e),
                    },
                    Err(e) => Err(e),
                };
                match outcome {
                    Ok(report) => ranked.push((name, report)),
                    Err(e) => warn!("Skipping {}: {}", resume.display(), e),
                }
                progress.inc(1);
            }
            progress.finish_and_clear();

            ranked.sort_by(|(name_a, a), (name_b, b)| {
                b.overall_score
                    .final_score
                    .total_cmp(&a.overall_score.final_score)
                    .then_with(|| name_a.cmp(name_b))
            });

            println!(
                "{:<4} {:<32} {:>6}  {:<16} {:>8}",
                "#", "Resume", "Score", "Rating", "Matched"
            );
            for (i, (name, report)) in ranked.iter().enumerate() {
                println!(
                    "{:<4} {:<32} {:>6.1}  {:<16} {:>8}",
                    i + 1,
                    name,
                    report.overall_score.final_score,
                    report.overall_score.rating.label(),
                    format!(
                        "{}/{}",
                        report.skills_analysis.total_matched, report.skills_analysis.total_required
                    )
                );
            }
        }

        Commands::Skills { file, taxonomy } => {
            check_extension(&file, "Document")?;

            let mut input_manager = input_manager(&config);
            let text = input_manager.extract_text(&file).await?;

            // Skill listing needs no embeddings
            let analyzer = build_analyzer(&config, &taxonomy, true)?;
            let profile = analyzer.profile(&text);

            println!("Skills found in {}:", file.display());
            for (category, skills) in &profile.skills {
                println!("  {}: {}", category, skills.join(", "));
            }
            println!("Total: {}", SkillExtractor::skill_count(&profile.skills));
            println!("Experience: {}", profile.years_of_experience);
            if let Some(level) = profile.education {
                println!("Education: {}", level);
            }
            if profile.has_certifications {
                println!("Certifications mentioned");
            }
        }

        Commands::Config { action } => {
            let save_config = |config: &Config| match &config_path {
                Some(path) => config.save_to(path),
                None => config.save(),
            };

            match action {
                Some(ConfigAction::Show) | None => {
                    let rendered = toml::to_string_pretty(&config).map_err(|e| {
                        ResumeMatcherError::Configuration(format!("Failed to render config: {}", e))
                    })?;
                    println!(
                        "# {}\n{}",
                        config_path.clone().unwrap_or_else(Config::config_path).display(),
                        rendered
                    );
                }

                Some(ConfigAction::Reset) => {
                    save_config(&Config::default())?;
                    println!("Configuration reset to defaults");
                }

                Some(ConfigAction::Set { key, value }) => {
                    config.set_value(&key, &value)?;
                    save_config(&config)?;
                    println!("Set {} = {}", key, value);
                }
            }
        }
    }

    Ok(())
}

fn check_extension(path: &Path, label: &str) -> Result<()> {
    cli::validate_file_extension(path, cli::SUPPORTED_EXTENSIONS)
        .map_err(|e| ResumeMatcherError::InvalidInput(format!("{} {}: {}", label, path.display(), e)))
}

fn input_manager(config: &Config) -> InputManager {
    InputManager::new().with_min_text_length(config.extraction.min_text_length)
}

/// Built-in table plus configured and command-line taxonomy files
fn load_taxonomy(config: &Config, extra: &[PathBuf]) -> Result<SkillTaxonomy> {
    let mut taxonomy = if config.taxonomy.include_builtin {
        SkillTaxonomy::builtin()
    } else {
        SkillTaxonomy::new()
    };

    for source in config.taxonomy.sources.iter().chain(extra) {
        let loaded = SkillTaxonomy::from_json_file(source)?;
        info!("Loaded {} skills from {}", loaded.skill_count(), source.display());
        taxonomy.merge(&loaded);
    }

    if taxonomy.is_empty() {
        return Err(ResumeMatcherError::Taxonomy(
            "No skills available: enable the built-in taxonomy or add a source".to_string(),
        ));
    }

    Ok(taxonomy)
}

fn build_analyzer(config: &Config, extra_taxonomy: &[PathBuf], no_embeddings: bool) -> Result<ResumeAnalyzer> {
    let taxonomy = Arc::new(load_taxonomy(config, extra_taxonomy)?);

    let embeddings = if no_embeddings {
        EmbeddingEngine::disabled("Embeddings disabled on the command line")
    } else {
        match EmbeddingEngine::from_config(config) {
            Ok(engine) => engine,
            Err(e) => {
                warn!("Embedding model unavailable, continuing without semantic matching: {}", e);
                EmbeddingEngine::disabled(e.to_string())
            }
        }
    };

    ResumeAnalyzer::new(config, taxonomy, embeddings)
}
