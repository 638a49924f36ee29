use serde::{Deserialize, Serialize};

/// Relative weight of each scoring component. Tables are expected to sum
/// to 1.0 so the overall score stays on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub technical: f64,
    pub culture: f64,
    pub red_flags: f64,
    pub cv_quality: f64,
}

/// Focus-checklist policy: red flags carry their own weighted term.
pub const CHECKLIST_WEIGHTS: ScoreWeights = ScoreWeights {
    technical: 0.35,
    culture: 0.30,
    red_flags: 0.20,
    cv_quality: 0.15,
};

/// Skill-volume policy: red flags are folded out of the weighted sum and
/// the freed weight moves to CV quality.
pub const SKILL_VOLUME_WEIGHTS: ScoreWeights = ScoreWeights {
    technical: 0.35,
    culture: 0.30,
    red_flags: 0.0,
    cv_quality: 0.35,
};

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.technical + self.culture + self.red_flags + self.cv_quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_tables_sum_to_one() {
        assert!((CHECKLIST_WEIGHTS.sum() - 1.0).abs() < f64::EPSILON);
        assert!((SKILL_VOLUME_WEIGHTS.sum() - 1.0).abs() < f64::EPSILON);
    }
}
