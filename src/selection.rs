/// Best hit selection
///
/// Within a gene family the reported call is:
/// - the longest perfect hit(s) if any hit is perfect (100% identity, full
///   length);
/// - otherwise the hit(s) with the lowest length score, then the highest
///   percent identity, then the longest alignment.
///
/// Exact ties on every criterion are all reported. The length score
/// (allele length - HSP length + gaps) follows the MLST allele scoring
/// convention of Larsen et al. 2012.
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::cluster::{group_by_database_cluster, ClusterGroups};
use crate::config::{SelectionConfig, SelectionMode};
use crate::error::{HitError, Result};
use crate::filter::{filter_by_coverage, filter_by_identity};
use crate::hit::{HitRecord, HitStatistics};

/// Best hit(s) of one gene-family group, in input order
pub fn select_best<S: HitStatistics + Clone>(hits: &[HitRecord<S>]) -> Result<Vec<HitRecord<S>>> {
    log::debug!("Detecting best from list of {} hit(s)", hits.len());
    if hits.is_empty() {
        return Err(HitError::EmptyInput);
    }

    let perfect: Vec<&HitRecord<S>> = hits.iter().filter(|h| h.stats().is_perfect_hit()).collect();
    let best: Vec<&HitRecord<S>> = if perfect.is_empty() {
        let best = best_imperfect_hits(hits.iter().collect());
        log::debug!(
            "No perfect hits found, {} equivalent imperfect hit(s) found: {}",
            best.len(),
            join_loci(&best)
        );
        best
    } else {
        log::debug!(
            "{} perfect hit(s) found: {}",
            perfect.len(),
            join_loci(&perfect)
        );
        keep_max_by(perfect, |h| h.stats().subject_length())
    };

    Ok(best.into_iter().cloned().collect())
}

fn best_imperfect_hits<S: HitStatistics>(hits: Vec<&HitRecord<S>>) -> Vec<&HitRecord<S>> {
    let lowest_length_score = keep_max_by(hits, |h| -h.stats().length_score());
    let highest_identity = keep_max_by(lowest_length_score, |h| {
        OrderedFloat(h.stats().percent_identity())
    });
    keep_max_by(highest_identity, |h| h.stats().alignment_length())
}

/// All candidates sharing the maximum key
fn keep_max_by<T, K, F>(candidates: Vec<T>, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let Some(max) = candidates.iter().map(&key).max() else {
        return candidates;
    };
    candidates.into_iter().filter(|c| key(c) == max).collect()
}

fn join_loci<S: HitStatistics>(hits: &[&HitRecord<S>]) -> String {
    hits.iter().map(|h| h.locus()).collect::<Vec<_>>().join(", ")
}

/// Best hits of every group, ordered by locus then query start
pub fn select_best_per_group<S>(groups: &ClusterGroups<S>) -> Result<Vec<HitRecord<S>>>
where
    S: HitStatistics + Clone + Send + Sync,
{
    let group_hits: Vec<&Vec<HitRecord<S>>> = groups.values().collect();
    let selected: Vec<Vec<HitRecord<S>>> = group_hits
        .par_iter()
        .map(|hits| select_best(hits))
        .collect::<Result<_>>()?;

    let mut reported: Vec<HitRecord<S>> = selected.into_iter().flatten().collect();
    sort_for_report(&mut reported);
    Ok(reported)
}

/// Presentation order: locus, then position on the query
pub fn sort_for_report<S: HitStatistics>(hits: &mut [HitRecord<S>]) {
    hits.sort_by(|a, b| {
        a.locus()
            .cmp(b.locus())
            .then_with(|| a.stats().query_start().cmp(&b.stats().query_start()))
    });
}

/// First `n` hits in input (aligner score) order
pub fn select_top_n<S>(mut hits: Vec<HitRecord<S>>, n: Option<usize>) -> Result<Vec<HitRecord<S>>> {
    let n = n.ok_or_else(|| {
        HitError::InvalidParameter(
            "'top_n' needs to be set when the selection mode is 'score'".to_string(),
        )
    })?;
    hits.truncate(n);
    Ok(hits)
}

/// Filter and select hits according to `config`
pub fn select_hits<S>(hits: Vec<HitRecord<S>>, config: &SelectionConfig) -> Result<Vec<HitRecord<S>>>
where
    S: HitStatistics + Clone + Send + Sync,
{
    config.validate()?;

    let hits = filter_by_identity(hits, config.min_percent_identity);
    let hits = filter_by_coverage(hits, config.min_coverage);
    log::info!("Filtering method: '{}'", config.mode);

    match config.mode {
        SelectionMode::Cluster => {
            let groups = group_by_database_cluster(hits)?;
            select_best_per_group(&groups)
        }
        SelectionMode::Score => select_top_n(hits, config.top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::BlastHit;
    use crate::statistics::AlignmentStatistics;

    fn hit(subject_id: &str, subject_length: u64, aligned: &str, identity: f64) -> BlastHit {
        let stats = AlignmentStatistics::new(
            subject_id,
            subject_length,
            aligned,
            "contig_1",
            0,
            aligned.len() as u64,
            identity,
        )
        .unwrap();
        HitRecord::from_stats(stats)
    }

    fn subjects(hits: &[BlastHit]) -> Vec<&str> {
        hits.iter().map(|h| h.stats().subject_id()).collect()
    }

    #[test]
    fn test_empty_group_is_an_error() {
        assert!(matches!(
            select_best::<AlignmentStatistics>(&[]),
            Err(HitError::EmptyInput)
        ));
    }

    #[test]
    fn test_equal_length_perfect_hits_are_all_reported() {
        let hits = vec![
            hit("0__geneX__a1__1", 20, &"A".repeat(20), 100.0),
            hit("0__geneX__a2__2", 20, &"C".repeat(20), 100.0),
            hit("0__geneX__a3__3", 15, &"G".repeat(15), 100.0),
        ];
        let best = select_best(&hits).unwrap();
        assert_eq!(subjects(&best), vec!["0__geneX__a1__1", "0__geneX__a2__2"]);
    }

    #[test]
    fn test_identity_breaks_length_score_ties() {
        let hits = vec![
            hit("0__geneX__a1__1", 100, &"A".repeat(95), 97.0),
            hit("0__geneX__a2__2", 100, &"A".repeat(95), 98.0),
        ];
        let best = select_best(&hits).unwrap();
        assert_eq!(subjects(&best), vec!["0__geneX__a2__2"]);
    }

    #[test]
    fn test_alignment_length_is_final_tie_break() {
        // Same length score (5) and identity, different alignment length
        let with_gaps = format!("{}{}", "A".repeat(97), "--");
        let hits = vec![
            hit("0__geneX__a1__1", 100, &"A".repeat(95), 98.0),
            hit("0__geneX__a2__2", 102, &with_gaps, 98.0),
        ];
        assert_eq!(hits[0].stats().length_score(), hits[1].stats().length_score());

        let best = select_best(&hits).unwrap();
        assert_eq!(subjects(&best), vec!["0__geneX__a2__2"]);
    }

    #[test]
    fn test_top_n() {
        let hits = vec![
            hit("0__geneX__a1__1", 10, "AAAAAAAAAA", 100.0),
            hit("1__geneY__b1__1", 10, "AAAAAAAAAA", 100.0),
            hit("2__geneZ__c1__1", 10, "AAAAAAAAAA", 100.0),
        ];
        assert_eq!(select_top_n(hits.clone(), Some(2)).unwrap().len(), 2);
        assert_eq!(select_top_n(hits.clone(), Some(10)).unwrap().len(), 3);
        assert!(matches!(
            select_top_n(hits, None),
            Err(HitError::InvalidParameter(_))
        ));
    }
}
