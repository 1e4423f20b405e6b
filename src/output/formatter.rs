//! Report renderers: colored console text, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::{Result, ResumeMatcherError};
use crate::processing::similarity_matcher::SkillPair;
use crate::scoring::{Rating, Report};
use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &Report) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks a formatter per output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn rating_color(rating: Rating) -> Color {
    match rating {
        Rating::Excellent => Color::Green,
        Rating::VeryGood => Color::BrightGreen,
        Rating::Good => Color::Yellow,
        Rating::Fair => Color::BrightYellow,
        Rating::Moderate => Color::Red,
        Rating::Weak => Color::BrightRed,
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn format_pairs(pairs: &[SkillPair]) -> Vec<String> {
    pairs
        .iter()
        .map(|p| format!("{} ~ {} ({:.2})", p.required, p.candidate, p.score))
        .collect()
}

fn fmt_err(e: std::fmt::Error) -> ResumeMatcherError {
    ResumeMatcherError::OutputFormatting(e.to_string())
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_rating_badge(&self, rating: Rating) -> String {
        let label = rating.label().to_uppercase();
        if self.use_colors {
            format!("[{}]", label.color(rating_color(rating)).bold())
        } else {
            format!("[{}]", label)
        }
    }

    fn format_skill_line(&self, label: &str, skills: &[String], color: Color) -> String {
        format!(
            "{} ({}): {}\n",
            label,
            skills.len(),
            self.colorize(&join_or_none(skills), color)
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let score = &report.overall_score;
        let skills = &report.skills_analysis;

        output.push_str(&self.format_header("RESUME MATCH ANALYSIS", 1));
        writeln!(
            output,
            "Job: {} | Generated: {}",
            report.metadata.job_title,
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .map_err(fmt_err)?;

        output.push_str(&self.format_header("Overall Score", 2));
        writeln!(
            output,
            "Final Score: {:.1}/100 {}",
            score.final_score,
            self.format_rating_badge(score.rating)
        )
        .map_err(fmt_err)?;
        writeln!(output, "  Skills:         {:>5.1}", score.breakdown.skill_score).map_err(fmt_err)?;
        writeln!(output, "  Semantic:       {:>5.1}", score.breakdown.semantic_score).map_err(fmt_err)?;
        writeln!(output, "  Experience:     {:>5.1}", score.breakdown.experience_score).map_err(fmt_err)?;
        writeln!(output, "  Qualifications: {:>5.1}", score.breakdown.qualification_score)
            .map_err(fmt_err)?;

        output.push_str(&self.format_header("Skills", 2));
        writeln!(
            output,
            "Matched {}/{} required skills ({:.1}%)",
            skills.total_matched, skills.total_required, skills.match_rate
        )
        .map_err(fmt_err)?;
        output.push_str(&self.format_skill_line("Exact", &skills.matched_exact, Color::Green));
        output.push_str(&self.format_skill_line("Similar", &skills.matched_fuzzy, Color::Cyan));
        output.push_str(&self.format_skill_line("Semantic", &skills.matched_semantic, Color::Cyan));
        output.push_str(&self.format_skill_line("Missing", &skills.missing, Color::Red));
        if self.detailed {
            output.push_str(&self.format_skill_line("Additional", &skills.extra, Color::White));
            let mut pairs = format_pairs(&skills.fuzzy_pairs);
            pairs.extend(format_pairs(&skills.semantic_pairs));
            for pair in &pairs {
                writeln!(output, "  {}", pair).map_err(fmt_err)?;
            }
        }

        output.push_str(&self.format_header("Experience", 2));
        writeln!(output, "{}", report.experience_analysis.message).map_err(fmt_err)?;
        writeln!(
            output,
            "Semantic alignment: {:.3} ({})",
            report.semantic_analysis.overall_similarity, report.semantic_analysis.interpretation
        )
        .map_err(fmt_err)?;

        if self.detailed {
            output.push_str(&self.format_header("Job Requirements", 3));
            let requirements = &report.requirements;
            writeln!(output, "Preferred: {}", join_or_none(&requirements.preferred_skills))
                .map_err(fmt_err)?;
            let education: Vec<String> = requirements
                .education_levels
                .iter()
                .map(ToString::to_string)
                .collect();
            writeln!(output, "Education: {}", join_or_none(&education)).map_err(fmt_err)?;
            writeln!(
                output,
                "Key technologies: {}",
                join_or_none(&requirements.key_technologies)
            )
            .map_err(fmt_err)?;
        }

        if !report.strengths.is_empty() {
            output.push_str(&self.format_header("Strengths", 2));
            for strength in &report.strengths {
                writeln!(output, "  {} {}", self.colorize("+", Color::Green), strength)
                    .map_err(fmt_err)?;
            }
        }

        output.push_str(&self.format_header("Recommendations", 2));
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            writeln!(output, "  {}. {}", i + 1, recommendation).map_err(fmt_err)?;
        }

        output.push_str(&self.format_header("Summary", 2));
        writeln!(output, "{}", self.colorize(&report.summary, Color::Cyan)).map_err(fmt_err)?;

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn skill_row(label: &str, skills: &[String]) -> String {
        format!("| {} | {} | {} |\n", label, skills.len(), join_or_none(skills))
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut md = String::new();
        let score = &report.overall_score;
        let skills = &report.skills_analysis;

        md.push_str("# Resume Match Analysis\n\n");
        if self.include_metadata {
            writeln!(md, "- **Job:** {}", report.metadata.job_title).map_err(fmt_err)?;
            writeln!(
                md,
                "- **Generated:** {}",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
            .map_err(fmt_err)?;
            writeln!(md, "- **Version:** {}\n", report.metadata.analyzer_version).map_err(fmt_err)?;
        }

        writeln!(md, "## Overall Score: {:.1}/100 ({})\n", score.final_score, score.rating)
            .map_err(fmt_err)?;
        md.push_str("| Component | Score |\n|---|---|\n");
        writeln!(md, "| Skills | {:.1} |", score.breakdown.skill_score).map_err(fmt_err)?;
        writeln!(md, "| Semantic | {:.1} |", score.breakdown.semantic_score).map_err(fmt_err)?;
        writeln!(md, "| Experience | {:.1} |", score.breakdown.experience_score).map_err(fmt_err)?;
        writeln!(md, "| Qualifications | {:.1} |\n", score.breakdown.qualification_score)
            .map_err(fmt_err)?;

        writeln!(
            md,
            "## Skills ({}/{} matched, {:.1}%)\n",
            skills.total_matched, skills.total_required, skills.match_rate
        )
        .map_err(fmt_err)?;
        md.push_str("| Type | Count | Skills |\n|---|---|---|\n");
        md.push_str(&Self::skill_row("Exact", &skills.matched_exact));
        md.push_str(&Self::skill_row("Similar", &skills.matched_fuzzy));
        md.push_str(&Self::skill_row("Semantic", &skills.matched_semantic));
        md.push_str(&Self::skill_row("Missing", &skills.missing));
        md.push_str(&Self::skill_row("Additional", &skills.extra));
        md.push('\n');

        md.push_str("## Experience\n\n");
        writeln!(md, "{}\n", report.experience_analysis.message).map_err(fmt_err)?;
        writeln!(
            md,
            "Semantic alignment: {:.3} ({})\n",
            report.semantic_analysis.overall_similarity, report.semantic_analysis.interpretation
        )
        .map_err(fmt_err)?;

        if !report.strengths.is_empty() {
            md.push_str("## Strengths\n\n");
            for strength in &report.strengths {
                writeln!(md, "- {}", strength).map_err(fmt_err)?;
            }
            md.push('\n');
        }

        md.push_str("## Recommendations\n\n");
        for (i, recommendation) in report.recommendations.iter().enumerate() {
            writeln!(md, "{}. {}", i + 1, recommendation).map_err(fmt_err)?;
        }

        writeln!(md, "\n## Summary\n\n{}", report.summary).map_err(fmt_err)?;
        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(
        use_colors: bool,
        detailed: bool,
        pretty_json: bool,
        include_metadata: bool,
    ) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &Report, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_match{}.{}", base_name, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::skill_extractor::ExperienceYears;
    use crate::processing::similarity_matcher::MatchResult;
    use crate::scoring::summary_generator::RequirementsSummary;
    use crate::scoring::{ExperienceScorer, ReportInput, ScoreBreakdown, SummaryGenerator};
    use chrono::{TimeZone, Utc};

    fn sample_report() -> Report {
        let match_result = MatchResult {
            matched_exact: vec!["Python".into()],
            matched_fuzzy: vec!["PostgreSQL".into()],
            missing: vec!["AWS".into()],
            fuzzy_pairs: vec![SkillPair {
                required: "PostgreSQL".into(),
                candidate: "Postgre SQL".into(),
                score: 90.9,
            }],
            ..MatchResult::default()
        };
        SummaryGenerator::new().generate_report(ReportInput {
            final_score: 72.4,
            breakdown: ScoreBreakdown {
                skill_score: 60.0,
                semantic_score: 81.0,
                experience_score: 85.0,
                qualification_score: 40.0,
            },
            match_result: &match_result,
            semantic_similarity: 0.81,
            experience_analysis: ExperienceScorer::new()
                .analyze_experience_gap(ExperienceYears::Known(4), ExperienceYears::Known(5)),
            requirements: RequirementsSummary::default(),
            contact_info: Default::default(),
            job_title: Some("Backend Engineer"),
            generated_at: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
        })
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, true)
            .format_report(&sample_report())
            .unwrap();
        assert!(output.contains("Final Score: 72.4/100 [GOOD MATCH]"));
        assert!(output.contains("Missing (1): AWS"));
        assert!(output.contains("PostgreSQL ~ Postgre SQL (90.90)"));
        assert!(output.contains("Backend Engineer"));
    }

    #[test]
    fn test_json_formatter_round_trips() {
        let report = sample_report();
        let json = JsonFormatter::new(false).format_report(&report).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(json.contains("\"rating\":\"Good Match\""));
    }

    #[test]
    fn test_markdown_formatter() {
        let md = MarkdownFormatter::new(true).format_report(&sample_report()).unwrap();
        assert!(md.starts_with("# Resume Match Analysis"));
        assert!(md.contains("## Overall Score: 72.4/100 (Good Match)"));
        assert!(md.contains("| Missing | 1 | AWS |"));
        assert!(md.contains("- **Job:** Backend Engineer"));
    }

    #[test]
    fn test_generator_dispatch_and_filenames() {
        let generator = ReportGenerator::with_options(false, false, true, false);
        let json = generator
            .generate_report(&sample_report(), &OutputFormat::Json)
            .unwrap();
        assert!(json.starts_with('{'));

        assert_eq!(
            suggest_filename(&OutputFormat::Markdown, "cv/jane_doe.pdf", false),
            "jane_doe_match.md"
        );
        assert_eq!(suggest_filename(&OutputFormat::Json, "resume.docx", false), "resume_match.json");
    }

    #[test]
    fn test_save_report_creates_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("out.md");
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# report");
    }
}
