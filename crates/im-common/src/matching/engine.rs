use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::culture::CultureAnalyzer;
use crate::analysis::feedback::{FeedbackBundle, FeedbackComposer};
use crate::analysis::red_flags::RedFlagAnalyzer;
use crate::analysis::skills::SkillAnalyzer;
use crate::analysis::AnalysisMethod;
use crate::llm::config::{parse_u64, BackendConfig};
use crate::llm::{create_provider, ConfigError, TextGenerator};
use crate::matching::label::RankingLabel;
use crate::matching::ranking::rank;
use crate::matching::weights::{ScoreWeights, CHECKLIST_WEIGHTS, SKILL_VOLUME_WEIGHTS};
use crate::matching::MatchResult;
use crate::{CandidateRecord, CompanyProfile};

/// How the technical component is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TechnicalScorePolicy {
    /// Fraction of the company's focus-skill checklist covered, plus a
    /// small bonus per extra skill.
    #[default]
    FocusChecklist,
    /// Scores skill breadth alone, ignoring the checklist. Red flags drop
    /// out of the weighted sum under this policy.
    SkillVolume,
}

impl TechnicalScorePolicy {
    pub fn weights(self) -> ScoreWeights {
        match self {
            TechnicalScorePolicy::FocusChecklist => CHECKLIST_WEIGHTS,
            TechnicalScorePolicy::SkillVolume => SKILL_VOLUME_WEIGHTS,
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "checklist" | "focus-checklist" | "focus_checklist" => {
                Some(TechnicalScorePolicy::FocusChecklist)
            }
            "skill-volume" | "skill_volume" | "volume" => Some(TechnicalScorePolicy::SkillVolume),
            _ => None,
        }
    }
}

/// Engine settings, resolved once before a batch starts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub policy: TechnicalScorePolicy,
    pub backend: BackendConfig,
    /// Wall-clock budget per candidate before the heuristic result is
    /// substituted.
    pub candidate_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: TechnicalScorePolicy::default(),
            backend: BackendConfig::default(),
            candidate_timeout_secs: 120,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let policy = std::env::var("IM_SCORE_POLICY")
            .ok()
            .and_then(|label| TechnicalScorePolicy::parse(&label))
            .unwrap_or_default();

        Self {
            policy,
            backend: BackendConfig::from_env(),
            candidate_timeout_secs: parse_u64("IM_CANDIDATE_TIMEOUT_SECONDS", 120),
        }
    }

    /// Backend-less configuration: every analyzer runs its deterministic
    /// fallback.
    pub fn heuristic(policy: TechnicalScorePolicy) -> Self {
        Self {
            policy,
            backend: BackendConfig::disabled(),
            ..Self::default()
        }
    }
}

/// Scores candidates against one company profile.
///
/// Construction fails on an unknown provider or a missing credential; once
/// built, evaluation is total and per-candidate failures degrade to
/// heuristic results instead of aborting the batch.
pub struct MatchEngine {
    profile: CompanyProfile,
    policy: TechnicalScorePolicy,
    weights: ScoreWeights,
    candidate_deadline: Duration,
    skills: SkillAnalyzer,
    culture: CultureAnalyzer,
    red_flags: RedFlagAnalyzer,
    feedback: FeedbackComposer,
}

impl MatchEngine {
    pub fn new(profile: CompanyProfile, config: &EngineConfig) -> Result<Self, ConfigError> {
        let provider: Option<Arc<dyn TextGenerator>> = if config.backend.enabled {
            let provider = create_provider(&config.backend)?;
            info!(provider = provider.name(), model = %config.backend.model, "backend ready");
            Some(Arc::from(provider))
        } else {
            info!("backend disabled; running heuristic analysis only");
            None
        };

        Ok(Self::with_provider(
            profile,
            config.policy,
            provider,
            config.candidate_timeout_secs,
        ))
    }

    pub fn with_provider(
        profile: CompanyProfile,
        policy: TechnicalScorePolicy,
        provider: Option<Arc<dyn TextGenerator>>,
        candidate_timeout_secs: u64,
    ) -> Self {
        Self {
            profile,
            policy,
            weights: policy.weights(),
            candidate_deadline: Duration::from_secs(candidate_timeout_secs),
            skills: SkillAnalyzer::new(provider.clone()),
            culture: CultureAnalyzer::new(provider.clone()),
            red_flags: RedFlagAnalyzer::new(provider.clone()),
            feedback: FeedbackComposer::new(provider),
        }
    }

    /// Evaluates one candidate. Never fails: if the evaluation does not
    /// finish inside the per-candidate deadline, the heuristic result is
    /// returned in its place.
    pub async fn match_candidate(&self, candidate: &CandidateRecord) -> MatchResult {
        match tokio::time::timeout(self.candidate_deadline, self.evaluate(candidate)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    candidate = candidate.display_name(),
                    deadline_secs = self.candidate_deadline.as_secs(),
                    "candidate evaluation exceeded deadline; substituting heuristic result"
                );
                self.heuristic_result(candidate)
            }
        }
    }

    /// Evaluates a batch sequentially and returns it ranked best-first.
    pub async fn match_candidates(&self, candidates: &[CandidateRecord]) -> Vec<MatchResult> {
        let mut results = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            results.push(self.match_candidate(candidate).await);
        }
        rank(results)
    }

    async fn evaluate(&self, candidate: &CandidateRecord) -> MatchResult {
        let skills = self.skills.analyze(candidate, &self.profile).await;
        let culture = self.culture.analyze(candidate, &self.profile).await;
        let red_flags = self.red_flags.analyze(candidate).await;

        let technical_score = self.technical_score(candidate, &skills.technical_skills);
        let culture_score = culture.culture_score;
        let penalty = red_flags.severity.penalty();
        let cv_quality_score = score_cv_quality(candidate);

        let overall_score = self.combine(technical_score, culture_score, penalty, cv_quality_score);

        let method = if skills.method == AnalysisMethod::Ai
            || culture.method == AnalysisMethod::Ai
            || red_flags.method == AnalysisMethod::Ai
        {
            AnalysisMethod::Ai
        } else {
            AnalysisMethod::Fallback
        };

        let feedback = self
            .feedback
            .compose(&FeedbackBundle {
                candidate,
                overall_score,
                skills: &skills,
                culture: &culture,
                red_flags: &red_flags,
            })
            .await;

        MatchResult {
            name: candidate.display_name().to_string(),
            overall_score,
            technical_score,
            culture_score,
            cv_quality_score,
            red_flag_severity: red_flags.severity,
            ranking: RankingLabel::from_score(overall_score),
            rank: 0,
            feedback,
            skills,
            culture,
            red_flags,
            method,
        }
    }

    fn combine(&self, technical: u32, culture: u32, penalty: u32, cv_quality: u32) -> u32 {
        let overall = f64::from(technical) * self.weights.technical
            + f64::from(culture) * self.weights.culture
            + f64::from(100 - penalty.min(100)) * self.weights.red_flags
            + f64::from(cv_quality) * self.weights.cv_quality;
        (overall as u32).min(100)
    }

    fn technical_score(&self, candidate: &CandidateRecord, technical_skills: &[String]) -> u32 {
        match self.policy {
            TechnicalScorePolicy::FocusChecklist => self.checklist_score(technical_skills),
            TechnicalScorePolicy::SkillVolume => {
                let declared = candidate.skills.len() as u32;
                (50 + declared * 8).min(100)
            }
        }
    }

    fn checklist_score(&self, technical_skills: &[String]) -> u32 {
        // Without a checklist there is nothing to measure against.
        if self.profile.focus_skills.is_empty() {
            return 70;
        }

        let candidate: Vec<String> = technical_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let focus: Vec<String> = self
            .profile
            .focus_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();

        let matches = focus.iter().filter(|s| candidate.contains(s)).count();
        let base = matches as f64 / focus.len() as f64 * 100.0;

        let extras = candidate.iter().filter(|s| !focus.contains(s)).count() as f64;
        ((base + extras * 5.0).min(100.0)) as u32
    }

    /// Deterministic result used when the backend path is unavailable or
    /// over deadline. Presence of declared skills is the only signal.
    pub fn heuristic_result(&self, candidate: &CandidateRecord) -> MatchResult {
        let mut overall_score = 60;
        if !candidate.skills.is_empty() {
            overall_score += 10;
        }
        if !candidate.soft_skills.is_empty() {
            overall_score += 10;
        }

        let skills = self.skills.fallback(candidate);
        let culture = self.culture.fallback(candidate, &self.profile);
        let red_flags = self.red_flags.fallback();

        MatchResult {
            name: candidate.display_name().to_string(),
            overall_score,
            technical_score: 60,
            culture_score: culture.culture_score,
            cv_quality_score: score_cv_quality(candidate),
            red_flag_severity: red_flags.severity,
            ranking: RankingLabel::from_score(overall_score),
            rank: 0,
            feedback: "Basic matching - Full AI analysis not available".into(),
            skills,
            culture,
            red_flags,
            method: AnalysisMethod::Fallback,
        }
    }
}

/// Completeness score for the parsed record itself: base 50, +10 per key
/// section present, +5 for the institution, clamped to 100.
pub fn score_cv_quality(candidate: &CandidateRecord) -> u32 {
    let mut score = 50;
    if !candidate.name.trim().is_empty() {
        score += 10;
    }
    if !candidate.email.trim().is_empty() {
        score += 10;
    }
    if !candidate.degree.trim().is_empty() {
        score += 10;
    }
    if !candidate.institution.trim().is_empty() {
        score += 5;
    }
    if !candidate.experience.is_empty() {
        score += 10;
    }
    if !candidate.skills.is_empty() {
        score += 10;
    }
    if candidate.years_experience > 0 {
        score += 10;
    }
    score.min(100)
}
