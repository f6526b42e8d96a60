//! Round statistics over numeric votes.

use crate::protocol::VoteStatistics;

/// Compute average/median/min/max for the given numeric votes.
/// Returns `None` for an empty slice; a revealed round with no numeric
/// votes carries no statistics.
pub fn calculate(votes: &[f64]) -> Option<VoteStatistics> {
    if votes.is_empty() {
        return None;
    }

    let sum: f64 = votes.iter().sum();
    // one decimal place, half away from zero
    let average = (sum / votes.len() as f64 * 10.0).round() / 10.0;

    let mut sorted = votes.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(VoteStatistics {
        average,
        median,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}
