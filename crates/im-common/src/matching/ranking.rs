use super::MatchResult;

/// Orders a batch best-first and assigns dense 1-based ranks.
///
/// The sort is stable, so candidates with equal scores keep their input
/// order and ties get distinct consecutive ranks.
pub fn rank(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index as u32 + 1;
    }
    results
}
