use std::sync::Arc;

use tracing::{debug, warn};

use super::culture::CultureAnalysis;
use super::red_flags::RedFlagAnalysis;
use super::skills::SkillAnalysis;
use crate::llm::TextGenerator;
use crate::CandidateRecord;

/// Everything the composer needs to write candidate-facing feedback.
pub struct FeedbackBundle<'a> {
    pub candidate: &'a CandidateRecord,
    pub overall_score: u32,
    pub skills: &'a SkillAnalysis,
    pub culture: &'a CultureAnalysis,
    pub red_flags: &'a RedFlagAnalysis,
}

pub struct FeedbackComposer {
    provider: Option<Arc<dyn TextGenerator>>,
}

impl FeedbackComposer {
    pub fn new(provider: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { provider }
    }

    /// Free-text feedback for the candidate. Any backend failure or empty
    /// response degrades to the templated fallback, never an error.
    pub async fn compose(&self, bundle: &FeedbackBundle<'_>) -> String {
        if let Some(provider) = &self.provider {
            let prompt = build_prompt(bundle);
            match provider.generate_text(&prompt).await {
                Ok(text) if !text.trim().is_empty() => return text,
                Ok(_) => debug!("feedback generation returned empty text; using fallback"),
                Err(err) => warn!(error = %err, "feedback generation failed; using fallback"),
            }
        }

        fallback_feedback(bundle.candidate, bundle.overall_score)
    }
}

/// Neutral template keyed only on name and score.
pub fn fallback_feedback(candidate: &CandidateRecord, overall_score: u32) -> String {
    let name = if candidate.name.trim().is_empty() {
        "Candidate"
    } else {
        candidate.name.trim()
    };
    format!(
        "Thank you for your application, {name}!\n\n\
         Your profile shows a match score of {overall_score}%. Your experience and skills \
         align well with our requirements.\n\n\
         We encourage you to continue developing your leadership experience and technical depth.\n\n\
         Best of luck with your career!"
    )
}

fn build_prompt(bundle: &FeedbackBundle<'_>) -> String {
    format!(
        "Generate constructive, actionable feedback for this candidate.\n\
         Be specific and helpful. Mention what they did well and what they can improve.\n\n\
         Candidate: {}\n\
         Match Score: {}%\n\n\
         Strengths:\n{}\n\n\
         Culture Alignment:\n{}\n\n\
         Red Flags:\n{}\n\n\
         Generate personalized feedback that:\n\
         1. Celebrates their strengths\n\
         2. Explains why they match (or don't match)\n\
         3. Gives 2-3 specific improvement suggestions\n\
         4. Is encouraging and professional\n\n\
         Keep it to 150-200 words.",
        bundle.candidate.display_name(),
        bundle.overall_score,
        bundle.skills.soft_skills.join(", "),
        bundle.culture.reasoning,
        bundle.red_flags.flags.join(", "),
    )
}
