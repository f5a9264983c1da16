use super::domain::SuitabilityResult;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Order by category tier, then profit margin (highest first), keeping catalog
/// order for full ties, and keep at most `limit` entries.
pub fn rank(mut results: Vec<SuitabilityResult>, limit: usize) -> Vec<SuitabilityResult> {
    results.sort_by(|a, b| {
        a.category
            .rank()
            .cmp(&b.category.rank())
            .then_with(|| b.profit_margin.total_cmp(&a.profit_margin))
    });
    results.truncate(limit);
    results
}
