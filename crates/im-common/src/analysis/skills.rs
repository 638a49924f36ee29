use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{is_empty_object, list_field, score_field, str_field, AnalysisMethod};
use crate::llm::TextGenerator;
use crate::{CandidateRecord, CompanyProfile};

/// Technical and soft skill coverage derived from the candidate's declared
/// skills and experience descriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub evidence: String,
    pub confidence: u32,
    pub method: AnalysisMethod,
}

pub struct SkillAnalyzer {
    provider: Option<Arc<dyn TextGenerator>>,
}

impl SkillAnalyzer {
    pub fn new(provider: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { provider }
    }

    pub async fn analyze(
        &self,
        candidate: &CandidateRecord,
        profile: &CompanyProfile,
    ) -> SkillAnalysis {
        if let Some(provider) = &self.provider {
            let prompt = build_prompt(candidate, profile);
            match provider.generate_structured(&prompt, None).await {
                Ok(response) if !is_empty_object(&response) => {
                    return SkillAnalysis {
                        technical_skills: list_field(&response, "technical_skills"),
                        soft_skills: list_field(&response, "soft_skills"),
                        evidence: str_field(&response, "evidence"),
                        confidence: score_field(&response, "confidence", 0),
                        method: AnalysisMethod::Ai,
                    };
                }
                Ok(_) => debug!("skill extraction returned no structured data; using fallback"),
                Err(err) => warn!(error = %err, "skill extraction backend call failed; using fallback"),
            }
        }

        self.fallback(candidate)
    }

    /// Declared skills taken verbatim at half confidence.
    pub fn fallback(&self, candidate: &CandidateRecord) -> SkillAnalysis {
        SkillAnalysis {
            technical_skills: candidate.skills.clone(),
            soft_skills: candidate.soft_skills.clone(),
            evidence: "Declared skills taken verbatim".into(),
            confidence: 50,
            method: AnalysisMethod::Fallback,
        }
    }
}

/// Plain-text rendering of the candidate used as prompt context.
pub fn render_candidate_text(candidate: &CandidateRecord) -> String {
    let mut text = format!(
        "Name: {}\nDegree: {}\nInstitution: {}\nYears Experience: {}\n\nExperience:\n",
        candidate.display_name(),
        candidate.degree,
        candidate.institution,
        candidate.years_experience,
    );
    for entry in &candidate.experience {
        let _ = writeln!(text, "- {}: {}", entry.role, entry.description);
    }
    let _ = write!(text, "\nCurrent Skills: {}", candidate.skills.join(", "));
    text
}

fn build_prompt(candidate: &CandidateRecord, profile: &CompanyProfile) -> String {
    format!(
        "Analyze this CV and extract ALL skills (both technical and soft).\n\
         The company is hiring for these focus skills: {}\n\
         Return a JSON with:\n\
         - technical_skills: list of tech skills found\n\
         - soft_skills: list of soft skills found\n\
         - evidence: why these skills are present\n\
         - confidence: 0-100 score of how clear the skills are\n\n\
         CV Content:\n{}",
        profile.focus_skills.join(", "),
        render_candidate_text(candidate),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::{CannedProvider, FailingProvider};
    use crate::ExperienceEntry;

    fn candidate() -> CandidateRecord {
        CandidateRecord {
            name: "Ada Lovelace".into(),
            skills: vec!["Python".into(), "SQL".into()],
            soft_skills: vec!["Mentoring".into()],
            experience: vec![ExperienceEntry {
                role: "Data Engineer".into(),
                description: "Built pipelines".into(),
                ..ExperienceEntry::default()
            }],
            ..CandidateRecord::default()
        }
    }

    #[tokio::test]
    async fn backend_extraction_fills_artifact() {
        let provider = Arc::new(CannedProvider {
            response: r#"```json
{"technical_skills": ["Rust"], "soft_skills": ["Leadership"], "confidence": 85}
```"#
                .into(),
        });
        let analyzer = SkillAnalyzer::new(Some(provider));

        let analysis = analyzer
            .analyze(&candidate(), &CompanyProfile::default())
            .await;

        assert_eq!(analysis.method, AnalysisMethod::Ai);
        assert_eq!(analysis.technical_skills, vec!["Rust".to_string()]);
        assert_eq!(analysis.confidence, 85);
        // Missing field gets its documented default.
        assert_eq!(analysis.evidence, "");
    }

    #[tokio::test]
    async fn malformed_response_falls_back() {
        let provider = Arc::new(CannedProvider {
            response: "definitely not json".into(),
        });
        let analyzer = SkillAnalyzer::new(Some(provider));

        let analysis = analyzer
            .analyze(&candidate(), &CompanyProfile::default())
            .await;

        assert_eq!(analysis.method, AnalysisMethod::Fallback);
        assert_eq!(analysis.technical_skills, candidate().skills);
        assert_eq!(analysis.confidence, 50);
    }

    #[tokio::test]
    async fn backend_failure_falls_back() {
        let analyzer = SkillAnalyzer::new(Some(Arc::new(FailingProvider)));

        let analysis = analyzer
            .analyze(&candidate(), &CompanyProfile::default())
            .await;

        assert_eq!(analysis.method, AnalysisMethod::Fallback);
        assert_eq!(analysis.soft_skills, vec!["Mentoring".to_string()]);
    }

    #[tokio::test]
    async fn no_backend_uses_declared_skills() {
        let analyzer = SkillAnalyzer::new(None);

        let analysis = analyzer
            .analyze(&candidate(), &CompanyProfile::default())
            .await;

        assert_eq!(analysis.method, AnalysisMethod::Fallback);
        assert_eq!(analysis.technical_skills, vec!["Python", "SQL"]);
        assert_eq!(analysis.confidence, 50);
    }

    #[test]
    fn candidate_text_lists_experience() {
        let text = render_candidate_text(&candidate());
        assert!(text.contains("Name: Ada Lovelace"));
        assert!(text.contains("- Data Engineer: Built pipelines"));
        assert!(text.contains("Current Skills: Python, SQL"));
    }
}
