use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{bool_field, is_empty_object, list_field, str_field, AnalysisMethod};
use crate::llm::TextGenerator;
use crate::CandidateRecord;

/// Severity grade for timeline concerns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Fixed penalty table: points subtracted from a 100-point scale before
    /// weighting.
    pub fn penalty(self) -> u32 {
        match self {
            Severity::Low => 5,
            Severity::Medium => 15,
            Severity::High => 30,
        }
    }

    /// Lenient parse; unknown labels read as low.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "medium" => Severity::Medium,
            "high" => Severity::High,
            _ => Severity::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(label)
    }
}

/// Severity-graded concerns surfaced from the experience timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagAnalysis {
    pub flags: Vec<String>,
    pub severity: Severity,
    pub context: String,
    pub is_concerning: bool,
    pub method: AnalysisMethod,
}

pub struct RedFlagAnalyzer {
    provider: Option<Arc<dyn TextGenerator>>,
}

impl RedFlagAnalyzer {
    pub fn new(provider: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { provider }
    }

    pub async fn analyze(&self, candidate: &CandidateRecord) -> RedFlagAnalysis {
        if let Some(provider) = &self.provider {
            let prompt = build_prompt(candidate);
            match provider.generate_structured(&prompt, None).await {
                Ok(response) if !is_empty_object(&response) => {
                    let severity_label = str_field(&response, "severity");
                    return RedFlagAnalysis {
                        flags: list_field(&response, "flags"),
                        severity: Severity::parse_lenient(&severity_label),
                        context: str_field(&response, "context"),
                        is_concerning: bool_field(&response, "is_concerning"),
                        method: AnalysisMethod::Ai,
                    };
                }
                Ok(_) => debug!("red-flag analysis returned no structured data; using fallback"),
                Err(err) => warn!(error = %err, "red-flag analysis backend call failed; using fallback"),
            }
        }

        self.fallback()
    }

    /// Detection requires the backend; the heuristic path reports no flags
    /// rather than guessing.
    pub fn fallback(&self) -> RedFlagAnalysis {
        RedFlagAnalysis {
            flags: Vec::new(),
            severity: Severity::Low,
            context: "Basic analysis".into(),
            is_concerning: false,
            method: AnalysisMethod::Fallback,
        }
    }
}

fn render_timeline(candidate: &CandidateRecord) -> String {
    candidate
        .experience
        .iter()
        .map(|entry| {
            let duration = if entry.duration.is_empty() {
                "N/A"
            } else {
                &entry.duration
            };
            format!("- {} ({duration})\n", entry.role)
        })
        .collect()
}

fn build_prompt(candidate: &CandidateRecord) -> String {
    format!(
        "Analyze this CV for potential red flags.\n\
         Be contextual - job hopping might be OK if roles improved.\n\
         Gaps might be justified (education, sabbatical).\n\n\
         Experience Timeline:\n{}\n\
         Current Role: {}\n\
         Years Experience: {}\n\n\
         Return JSON with:\n\
         - flags: list of potential issues\n\
         - severity: low/medium/high\n\
         - context: explanation of flags\n\
         - is_concerning: boolean if serious",
        render_timeline(candidate),
        candidate.current_role,
        candidate.years_experience,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::{CannedProvider, FailingProvider};
    use crate::ExperienceEntry;

    #[test]
    fn penalty_table_is_fixed() {
        assert_eq!(Severity::Low.penalty(), 5);
        assert_eq!(Severity::Medium.penalty(), 15);
        assert_eq!(Severity::High.penalty(), 30);
    }

    #[test]
    fn unknown_severity_reads_as_low() {
        assert_eq!(Severity::parse_lenient("critical"), Severity::Low);
        assert_eq!(Severity::parse_lenient(""), Severity::Low);
        assert_eq!(Severity::parse_lenient(" HIGH "), Severity::High);
        assert_eq!(Severity::parse_lenient("Medium"), Severity::Medium);
    }

    #[tokio::test]
    async fn backend_severity_is_parsed_leniently() {
        let provider = Arc::new(CannedProvider {
            response: r#"{"flags": ["three jobs in one year"], "severity": "Medium", "is_concerning": true}"#
                .into(),
        });
        let analyzer = RedFlagAnalyzer::new(Some(provider));

        let analysis = analyzer.analyze(&CandidateRecord::default()).await;

        assert_eq!(analysis.method, AnalysisMethod::Ai);
        assert_eq!(analysis.severity, Severity::Medium);
        assert!(analysis.is_concerning);
        // Missing context gets its documented default.
        assert_eq!(analysis.context, "");
    }

    #[tokio::test]
    async fn fallback_is_maximally_lenient() {
        let analyzer = RedFlagAnalyzer::new(Some(Arc::new(FailingProvider)));

        let analysis = analyzer.analyze(&CandidateRecord::default()).await;

        assert_eq!(analysis.method, AnalysisMethod::Fallback);
        assert!(analysis.flags.is_empty());
        assert_eq!(analysis.severity, Severity::Low);
        assert!(!analysis.is_concerning);
    }

    #[test]
    fn timeline_lists_roles_with_durations() {
        let candidate = CandidateRecord {
            experience: vec![
                ExperienceEntry {
                    role: "Engineer".into(),
                    duration: "2019-2021".into(),
                    ..ExperienceEntry::default()
                },
                ExperienceEntry {
                    role: "Lead".into(),
                    ..ExperienceEntry::default()
                },
            ],
            ..CandidateRecord::default()
        };

        let timeline = render_timeline(&candidate);
        assert!(timeline.contains("- Engineer (2019-2021)"));
        assert!(timeline.contains("- Lead (N/A)"));
    }
}
