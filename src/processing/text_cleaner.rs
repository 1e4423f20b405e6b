//! Text cleaning and normalization

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "can", "this", "that",
    "these", "those", "i", "you", "he", "she", "it", "we", "they",
];

/// Contact details pulled from the raw document before cleaning strips them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.linkedin.is_none() && self.github.is_none()
    }
}

pub struct TextCleaner {
    lowercase: bool,
    remove_stopwords: bool,
    stopwords: HashSet<&'static str>,
    url_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
    linkedin_regex: Regex,
    github_regex: Regex,
    horizontal_ws_regex: Regex,
    line_edge_regex: Regex,
    blank_lines_regex: Regex,
    leading_bullet_regex: Regex,
    inline_bullet_regex: Regex,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl TextCleaner {
    pub fn new(lowercase: bool, remove_stopwords: bool) -> Self {
        Self {
            lowercase,
            remove_stopwords,
            stopwords: STOPWORDS.iter().copied().collect(),
            url_regex: Regex::new(r"(?i)(?:https?://|www\.)[^\s]+").expect("Invalid URL regex"),
            email_regex: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("Invalid email regex"),
            phone_regex: Regex::new(r"(?:\+?1[-. ]?)?\(?\b[0-9]{3}\)?[-. ]?[0-9]{3}[-. ]?[0-9]{4}\b")
                .expect("Invalid phone regex"),
            linkedin_regex: Regex::new(r"(?i)linkedin\.com/in/[\w-]+")
                .expect("Invalid LinkedIn regex"),
            github_regex: Regex::new(r"(?i)github\.com/[\w-]+").expect("Invalid GitHub regex"),
            horizontal_ws_regex: Regex::new(r"[^\S\n]+").expect("Invalid whitespace regex"),
            line_edge_regex: Regex::new(r" ?\n ?").expect("Invalid line edge regex"),
            blank_lines_regex: Regex::new(r"\n{3,}").expect("Invalid blank line regex"),
            leading_bullet_regex: Regex::new(r"(?m)^(?:[•●○■□▪▫◦‣∙][^\S\n]*|[-*][^\S\n]+)+")
                .expect("Invalid bullet regex"),
            inline_bullet_regex: Regex::new(r"[•●○■□▪▫◦‣∙]").expect("Invalid bullet regex"),
        }
    }

    /// Run the full cleaning pipeline. Idempotent; empty input gives empty output.
    pub fn clean(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let mut cleaned = self.remove_urls(text);
        cleaned = self.remove_emails(&cleaned);
        cleaned = self.normalize_whitespace(&cleaned);
        cleaned = self.normalize_bullets(&cleaned);

        if self.lowercase {
            cleaned = cleaned.to_lowercase();
        }

        if self.remove_stopwords {
            cleaned = self.remove_stopwords_from_text(&cleaned);
            // "- the - Python" leaves a fresh leading "- "
            cleaned = self.normalize_bullets(&cleaned);
        }

        cleaned
    }

    pub fn remove_urls(&self, text: &str) -> String {
        self.url_regex.replace_all(text, "").into_owned()
    }

    pub fn remove_emails(&self, text: &str) -> String {
        self.email_regex.replace_all(text, "").into_owned()
    }

    /// Collapse runs of spaces; paragraph breaks survive as a single blank line
    pub fn normalize_whitespace(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");
        let spaced = self.horizontal_ws_regex.replace_all(&unified, " ");
        let trimmed_lines = self.line_edge_regex.replace_all(&spaced, "\n");
        let collapsed = self.blank_lines_regex.replace_all(&trimmed_lines, "\n\n");
        collapsed.trim().to_string()
    }

    pub fn normalize_bullets(&self, text: &str) -> String {
        let without_leading = self.leading_bullet_regex.replace_all(text, "");
        let without_inline = self.inline_bullet_regex.replace_all(&without_leading, " ");
        self.normalize_whitespace(&without_inline)
    }

    pub fn remove_stopwords_from_text(&self, text: &str) -> String {
        let filtered = text
            .split('\n')
            .map(|line| {
                line.split_whitespace()
                    .filter(|word| !self.stopwords.contains(word.to_lowercase().as_str()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");

        self.blank_lines_regex
            .replace_all(&filtered, "\n\n")
            .trim()
            .to_string()
    }

    /// Run on raw text; `clean` removes emails and URLs
    pub fn extract_contact_info(&self, text: &str) -> ContactInfo {
        let find = |re: &Regex| re.find(text).map(|m| m.as_str().to_string());

        ContactInfo {
            email: find(&self.email_regex),
            phone: find(&self.phone_regex),
            linkedin: find(&self.linkedin_regex),
            github: find(&self.github_regex),
        }
    }
}

/// Truncate on grapheme boundaries
pub fn truncate_for_embedding(text: &str, max_chars: usize) -> String {
    text.graphemes(true).take(max_chars).collect()
}
