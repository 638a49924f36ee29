use std::fmt;

use serde::{Deserialize, Serialize};

/// Human-facing recommendation band derived from the overall score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingLabel {
    Excellent,
    Good,
    Fair,
    #[default]
    NotRecommended,
}

impl RankingLabel {
    /// Band thresholds: 85, 70, 50.
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => RankingLabel::Excellent,
            70.. => RankingLabel::Good,
            50.. => RankingLabel::Fair,
            _ => RankingLabel::NotRecommended,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            RankingLabel::Excellent => "\u{1F7E2}",
            RankingLabel::Good => "\u{1F7E1}",
            RankingLabel::Fair => "\u{1F7E0}",
            RankingLabel::NotRecommended => "\u{1F534}",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RankingLabel::Excellent => "Excellent Match",
            RankingLabel::Good => "Good Match",
            RankingLabel::Fair => "Fair Match",
            RankingLabel::NotRecommended => "Not Recommended",
        }
    }
}

impl fmt::Display for RankingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.name())
    }
}
