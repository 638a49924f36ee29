use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{is_empty_object, list_field, score_field, str_field, AnalysisMethod};
use crate::llm::TextGenerator;
use crate::{CandidateRecord, CompanyProfile};

/// Culture-alignment score against the company mission and values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CultureAnalysis {
    pub culture_score: u32,
    pub reasoning: String,
    pub alignments: Vec<String>,
    pub gaps: Vec<String>,
    pub method: AnalysisMethod,
}

pub struct CultureAnalyzer {
    provider: Option<Arc<dyn TextGenerator>>,
}

impl CultureAnalyzer {
    pub fn new(provider: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { provider }
    }

    pub async fn analyze(
        &self,
        candidate: &CandidateRecord,
        profile: &CompanyProfile,
    ) -> CultureAnalysis {
        if let Some(provider) = &self.provider {
            let prompt = build_prompt(candidate, profile);
            match provider.generate_structured(&prompt, None).await {
                Ok(response) if !is_empty_object(&response) => {
                    return CultureAnalysis {
                        culture_score: score_field(&response, "culture_score", 0),
                        reasoning: str_field(&response, "reasoning"),
                        alignments: list_field(&response, "alignments"),
                        gaps: list_field(&response, "gaps"),
                        method: AnalysisMethod::Ai,
                    };
                }
                Ok(_) => debug!("culture analysis returned no structured data; using fallback"),
                Err(err) => warn!(error = %err, "culture analysis backend call failed; using fallback"),
            }
        }

        self.fallback(candidate, profile)
    }

    /// Deterministic value-token alignment. A company value counts as
    /// aligned when any whitespace-split token of it appears in the
    /// candidate's lowercased soft-skill set. Base 60, +10 per aligned
    /// value, clamped to 100.
    pub fn fallback(
        &self,
        candidate: &CandidateRecord,
        profile: &CompanyProfile,
    ) -> CultureAnalysis {
        let soft_skills: HashSet<String> = candidate
            .soft_skills
            .iter()
            .map(|skill| skill.trim().to_lowercase())
            .collect();

        let mut alignments = Vec::new();
        let mut gaps = Vec::new();
        for value in &profile.values {
            let aligned = value
                .split_whitespace()
                .any(|token| soft_skills.contains(&token.to_lowercase()));
            if aligned {
                alignments.push(value.clone());
            } else {
                gaps.push(value.clone());
            }
        }

        let culture_score = (60 + alignments.len() as u32 * 10).min(100);
        let reasoning = if alignments.is_empty() {
            "Promising candidate".to_string()
        } else {
            let highlighted: Vec<&str> = alignments
                .iter()
                .take(2)
                .map(String::as_str)
                .collect();
            format!("Good fit with focus on {}", highlighted.join(", "))
        };

        CultureAnalysis {
            culture_score,
            reasoning,
            alignments,
            gaps,
            method: AnalysisMethod::Fallback,
        }
    }
}

fn build_prompt(candidate: &CandidateRecord, profile: &CompanyProfile) -> String {
    format!(
        "Analyze culture fit between candidate and company.\n\n\
         Company Profile:\n\
         - Mission: {}\n\
         - Values: {}\n\
         - Focus Skills: {}\n\n\
         Candidate:\n\
         - Name: {}\n\
         - Current Role: {}\n\
         - Years Experience: {}\n\
         - Soft Skills: {}\n\
         - Tech Skills: {}\n\n\
         Return JSON with:\n\
         - culture_score: 0-100\n\
         - reasoning: why this score\n\
         - alignments: list of value alignments\n\
         - gaps: list of missing qualities",
        profile.mission,
        profile.values.join(", "),
        profile.focus_skills.join(", "),
        candidate.display_name(),
        candidate.current_role,
        candidate.years_experience,
        candidate.soft_skills.join(", "),
        candidate.skills.join(", "),
    )
}
