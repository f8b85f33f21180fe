use crate::hit::{HitRecord, HitStatistics};

/// Keep hits with a percent identity of at least `min_percent_identity`
pub fn filter_by_identity<S: HitStatistics>(
    hits: Vec<HitRecord<S>>,
    min_percent_identity: f64,
) -> Vec<HitRecord<S>> {
    let total = hits.len();
    let filtered: Vec<_> = hits
        .into_iter()
        .filter(|hit| hit.stats().percent_identity() >= min_percent_identity)
        .collect();
    log::info!(
        "{}/{} hits passed percent identity filtering ({} %)",
        filtered.len(),
        total,
        min_percent_identity
    );
    filtered
}

/// Keep hits covering at least `min_coverage` percent of their subject
pub fn filter_by_coverage<S: HitStatistics>(
    hits: Vec<HitRecord<S>>,
    min_coverage: f64,
) -> Vec<HitRecord<S>> {
    let total = hits.len();
    let filtered: Vec<_> = hits
        .into_iter()
        .filter(|hit| hit.stats().subject_coverage() >= min_coverage)
        .collect();
    log::info!(
        "{}/{} hits passed length coverage filtering ({} %)",
        filtered.len(),
        total,
        min_coverage
    );
    filtered
}
