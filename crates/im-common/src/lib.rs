pub mod analysis;
pub mod llm;
pub mod logging;
pub mod matching;
pub mod parse;

use serde::{Deserialize, Serialize};

/// One position in a candidate's work history. Insertion order is taken as
/// given; no chronological ordering is enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

/// Structured candidate data as produced by the document-parsing boundary.
///
/// Every field has a defined default; an absent field is a scoring-input
/// absence, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub degree: String,
    #[serde(alias = "university")]
    pub institution: String,
    pub years_experience: u32,
    pub current_role: String,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Bounded excerpt of the source document, diagnostic only.
    pub raw_text: String,
    /// Set by the parsing boundary when extraction degraded or failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl CandidateRecord {
    /// Display name with the documented "Unknown" default.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

/// Company-side inputs, immutable for the duration of a matching run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub mission: String,
    /// Duplicates tolerated, not deduplicated.
    pub values: Vec<String>,
    /// The technical-skill checklist used for match scoring.
    pub focus_skills: Vec<String>,
    pub role_description: String,
}
