//! Document-parsing boundary. Turns uploaded bytes into a
//! [`CandidateRecord`]; never fails, degraded extraction is reported via
//! the record's `diagnostic` field.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::{CandidateRecord, ExperienceEntry};

const RAW_TEXT_LIMIT: usize = 500;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+?1?\s*)?\d{3}[-.]?\d{3}[-.]?\d{4}").expect("phone regex")
});
static YEARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digits regex"));

const EDUCATION_KEYWORDS: &[&str] = &[
    "bs ", "ba ", "ms ", "ma ", "phd", "mba", "degree", "certificate",
];
const INSTITUTION_KEYWORDS: &[&str] = &["university", "college", "institute", "school"];
const ROLE_KEYWORDS: &[&str] = &[
    "engineer",
    "developer",
    "manager",
    "director",
    "lead",
    "analyst",
    "specialist",
];
const SKILL_KEYWORDS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "sql",
    "aws",
    "kubernetes",
    "git",
    "react",
    "django",
    "tensorflow",
    "pytorch",
    "machine learning",
    "ai",
    "ml",
];
const SOFT_SKILL_KEYWORDS: &[&str] = &[
    "leadership",
    "communication",
    "problem-solving",
    "teamwork",
    "collaboration",
    "creativity",
    "adaptability",
    "mentoring",
    "presentation",
];

/// Parses one uploaded document into a candidate record, dispatching on
/// the filename extension. Unknown extensions are read as plain text.
pub fn parse_document(filename: &str, bytes: &[u8]) -> CandidateRecord {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => parse_json(filename, bytes),
        "pdf" => parse_pdf(filename, bytes),
        "docx" | "doc" => parse_docx(filename, bytes),
        _ => parse_text(filename, bytes),
    }
}

fn parse_json(filename: &str, bytes: &[u8]) -> CandidateRecord {
    match serde_json::from_slice(bytes) {
        Ok(record) => record,
        Err(err) => {
            warn!(filename, error = %err, "invalid JSON candidate document");
            diagnostic_record(filename, "invalid JSON document")
        }
    }
}

fn parse_pdf(filename: &str, bytes: &[u8]) -> CandidateRecord {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => extract_from_text(&text),
        Err(err) => {
            warn!(filename, error = %err, "PDF text extraction failed");
            diagnostic_record(filename, "PDF text extraction failed")
        }
    }
}

fn parse_docx(filename: &str, bytes: &[u8]) -> CandidateRecord {
    match docx_text(bytes) {
        Ok(text) => extract_from_text(&text),
        Err(err) => {
            warn!(filename, error = %err, "word document extraction failed");
            diagnostic_record(filename, "word document extraction failed")
        }
    }
}

/// Pull the main document part out of the docx archive and flatten it to
/// plain text.
fn docx_text(bytes: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;
    Ok(flatten_docx_xml(&xml))
}

/// Text lives in `w:t` runs; paragraph and break elements become newlines.
fn flatten_docx_xml(xml: &str) -> String {
    let mut text = String::new();
    for segment in xml.split('<').skip(1) {
        let Some((tag, content)) = segment.split_once('>') else {
            continue;
        };
        if tag == "w:t" || tag.starts_with("w:t ") {
            text.push_str(&unescape_xml(content));
        } else if tag == "/w:p" || tag.starts_with("w:br") {
            text.push('\n');
        } else if tag.starts_with("w:tab") {
            text.push(' ');
        }
    }
    text
}

fn unescape_xml(content: &str) -> String {
    content
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn parse_text(filename: &str, bytes: &[u8]) -> CandidateRecord {
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        debug!(filename, "empty document");
    }
    extract_from_text(&text)
}

/// Minimal record carrying only the failure context, still scoreable.
pub fn diagnostic_record(filename: &str, reason: &str) -> CandidateRecord {
    CandidateRecord {
        diagnostic: Some(format!("{filename}: {reason}")),
        ..CandidateRecord::default()
    }
}

/// Keyword-and-pattern extraction over raw text. Every field degrades to
/// its default when nothing matches.
pub fn extract_from_text(text: &str) -> CandidateRecord {
    let lines: Vec<&str> = text.lines().collect();
    let mut record = CandidateRecord {
        raw_text: truncate_chars(text, RAW_TEXT_LIMIT),
        ..CandidateRecord::default()
    };

    // Name: first short non-empty line near the top.
    for line in lines.iter().take(5) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.len() < 50 {
            record.name = trimmed.to_string();
            break;
        }
    }

    if let Some(found) = EMAIL_RE.find(text) {
        record.email = found.as_str().to_string();
    }
    if let Some(found) = PHONE_RE.find(text) {
        record.phone = found.as_str().trim().to_string();
    }

    for line in &lines {
        let lower = line.to_lowercase();
        if record.degree.is_empty() && EDUCATION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            record.degree = line.trim().to_string();
        }
        if record.institution.is_empty()
            && INSTITUTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
        {
            record.institution = line.trim().to_string();
        }
    }

    for line in &lines {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        if trimmed.len() < 100 && ROLE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            if record.current_role.is_empty() {
                record.current_role = trimmed.to_string();
            }
            record.experience.push(ExperienceEntry {
                role: trimmed.to_string(),
                company: "Unknown".into(),
                duration: "N/A".into(),
                description: String::new(),
            });
        }
    }

    let lower_text = text.to_lowercase();
    for skill in SKILL_KEYWORDS {
        if lower_text.contains(skill) {
            record.skills.push(title_case(skill));
        }
    }
    for skill in SOFT_SKILL_KEYWORDS {
        if lower_text.contains(skill) {
            record.soft_skills.push(title_case(skill));
        }
    }

    // Years of experience: largest number on any line mentioning "year".
    for line in &lines {
        if line.to_lowercase().contains("year") {
            if let Some(found) = YEARS_RE.find(line) {
                if let Ok(years) = found.as_str().parse::<u32>() {
                    record.years_experience = record.years_experience.max(years);
                }
            }
        }
    }

    record
}

/// Char-boundary-safe prefix of at most `limit` characters.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Ada Lovelace\n\
        ada@example.com\n\
        555-123-4567\n\
        MS in Computer Science\n\
        Cambridge University\n\
        Senior Data Engineer at Analytica\n\
        8 years of experience building pipelines\n\
        Skills: Python, SQL, AWS\n\
        Strong communication and mentoring";

    #[test]
    fn text_extraction_finds_core_fields() {
        let record = parse_document("ada.txt", SAMPLE.as_bytes());

        assert_eq!(record.name, "Ada Lovelace");
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.phone, "555-123-4567");
        assert_eq!(record.degree, "MS in Computer Science");
        assert_eq!(record.institution, "Cambridge University");
        assert_eq!(record.current_role, "Senior Data Engineer at Analytica");
        assert_eq!(record.years_experience, 8);
        assert!(record.skills.contains(&"Python".to_string()));
        assert!(record.skills.contains(&"Sql".to_string()));
        assert!(record.soft_skills.contains(&"Communication".to_string()));
        assert!(record.soft_skills.contains(&"Mentoring".to_string()));
        assert!(record.diagnostic.is_none());
    }

    #[test]
    fn json_documents_deserialize_directly() {
        let record = parse_document(
            "ada.json",
            br#"{"name": "Ada", "skills": ["Rust"], "years_experience": 3}"#,
        );
        assert_eq!(record.name, "Ada");
        assert_eq!(record.skills, vec!["Rust".to_string()]);
        assert_eq!(record.years_experience, 3);
    }

    #[test]
    fn invalid_json_yields_diagnostic_record() {
        let record = parse_document("broken.json", b"{not json");
        assert_eq!(record, diagnostic_record("broken.json", "invalid JSON document"));
        assert!(record.diagnostic.is_some());
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        use std::io::Write;

        let mut buf = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut buf);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        write!(
            writer,
            r#"<?xml version="1.0"?><w:document><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        writer.finish().unwrap();
        drop(writer);
        buf.into_inner()
    }

    #[test]
    fn word_documents_extract_like_text() {
        let bytes = docx_bytes(&[
            "Ada Lovelace",
            "ada@example.com",
            "MS in Computer Science",
            "Senior Data Engineer",
            "8 years of experience with Python &amp; SQL",
        ]);

        let record = parse_document("ada.docx", &bytes);

        assert_eq!(record.name, "Ada Lovelace");
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.degree, "MS in Computer Science");
        assert_eq!(record.current_role, "Senior Data Engineer");
        assert_eq!(record.years_experience, 8);
        assert!(record.skills.contains(&"Python".to_string()));
        assert!(record.diagnostic.is_none());
    }

    #[test]
    fn corrupt_word_documents_yield_diagnostic_record() {
        let record = parse_document("cv.docx", b"PK\x03\x04");
        assert!(record
            .diagnostic
            .as_deref()
            .is_some_and(|d| d.contains("cv.docx")));
    }

    #[test]
    fn docx_xml_flattens_runs_and_paragraphs() {
        let xml = r#"<w:body><w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> there</w:t></w:r></w:p><w:p><w:r><w:t>Next &amp; last</w:t></w:r></w:p></w:body>"#;
        assert_eq!(flatten_docx_xml(xml), "Hello there\nNext & last\n");
    }

    #[test]
    fn unknown_extension_reads_as_text() {
        let record = parse_document("cv.md", SAMPLE.as_bytes());
        assert_eq!(record.name, "Ada Lovelace");
    }

    #[test]
    fn empty_input_is_total() {
        let record = parse_document("empty.txt", b"");
        assert_eq!(record, CandidateRecord::default());
    }

    #[test]
    fn raw_text_truncates_on_char_boundaries() {
        let text = "\u{00e9}".repeat(600);
        let record = extract_from_text(&text);
        assert_eq!(record.raw_text.chars().count(), 500);
    }
}
