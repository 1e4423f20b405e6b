//! Text extraction from various file formats

use crate::error::{Result, ResumeMatcherError};
use pulldown_cmark::{html, Parser};
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ResumeMatcherError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(text)
    }
}

/// Reads `word/document.xml` out of the DOCX container
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        Self::extract_from_bytes(&bytes).map_err(|e| match e {
            ResumeMatcherError::DocxExtraction(msg) => ResumeMatcherError::DocxExtraction(format!(
                "Failed to extract text from DOCX '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }
}

impl DocxExtractor {
    pub fn extract_from_bytes(bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut document = archive.by_name("word/document.xml")?;

        let mut xml = String::new();
        document.read_to_string(&mut xml)?;

        Self::document_xml_to_text(&xml)
    }

    /// Walks paragraphs and runs: `w:t` text, `w:tab` as a tab, `w:br`/`w:cr` as line breaks
    fn document_xml_to_text(xml: &str) -> Result<String> {
        let mut reader = XmlReader::from_str(xml);
        reader.trim_text(false);

        let mut text = String::new();
        let mut in_text = false;
        let mut in_run = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                ResumeMatcherError::DocxExtraction(format!(
                    "Malformed document.xml at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(element) if element.local_name().as_ref() == b"t" => in_text = true,
                Event::Start(element) if element.local_name().as_ref() == b"r" => in_run = true,
                Event::End(element) => match element.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"r" => in_run = false,
                    b"p" => text.push('\n'),
                    _ => {}
                },
                // Tab stops in paragraph properties are also `w:tab`
                Event::Empty(element) | Event::Start(element) if in_run => {
                    match element.local_name().as_ref() {
                        b"tab" | b"ptab" => text.push('\t'),
                        b"br" | b"cr" => text.push('\n'),
                        _ => {}
                    }
                }
                Event::Text(content) if in_text => {
                    let decoded = content.unescape().map_err(|e| {
                        ResumeMatcherError::DocxExtraction(format!("Bad entity in run text: {}", e))
                    })?;
                    text.push_str(&decoded);
                }
                Event::CData(content) if in_text => {
                    text.push_str(&String::from_utf8_lossy(&content.into_inner()));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        // Resumes exported from older tools are often Latin-1; keep going lossily
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("'{}' is not valid UTF-8, decoding lossily", path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(Self::markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    pub fn markdown_to_text(markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Self::html_to_text(&html_output)
    }

    fn html_to_text(html: &str) -> String {
        let text = html.replace("<br />", "\n").replace("<br>", "\n");
        let stripped = tag_regex().replace_all(&text, "");
        let decoded = decode_entities(&stripped);

        decoded
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
