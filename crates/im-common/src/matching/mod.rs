pub mod engine;
pub mod label;
pub mod ranking;
pub mod weights;

use serde::{Deserialize, Serialize};

use crate::analysis::culture::CultureAnalysis;
use crate::analysis::red_flags::{RedFlagAnalysis, Severity};
use crate::analysis::skills::SkillAnalysis;
use crate::analysis::AnalysisMethod;
use crate::matching::label::RankingLabel;

pub use engine::{EngineConfig, MatchEngine, TechnicalScorePolicy};
pub use ranking::rank;
pub use weights::ScoreWeights;

/// Full evaluation of one candidate against a company profile.
///
/// `rank` is 0 until the result has been through [`rank`]; a ranked batch
/// carries dense 1-based positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub name: String,
    pub overall_score: u32,
    pub technical_score: u32,
    pub culture_score: u32,
    pub cv_quality_score: u32,
    pub red_flag_severity: Severity,
    pub ranking: RankingLabel,
    pub rank: u32,
    pub feedback: String,
    pub skills: SkillAnalysis,
    pub culture: CultureAnalysis,
    pub red_flags: RedFlagAnalysis,
    pub method: AnalysisMethod,
}
