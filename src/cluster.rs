/// Grouping of hits by database gene family
///
/// The reference database names every allele `{index}__{cluster}__...`, with
/// alleles of the same gene family sharing the cluster name. Groups keep the
/// order in which their first hit was seen, and hits keep their input order.
use indexmap::IndexMap;

use crate::error::Result;
use crate::hit::{HitRecord, HitStatistics};

/// Hits per gene-family key, in order of first occurrence
pub type ClusterGroups<S> = IndexMap<String, Vec<HitRecord<S>>>;

pub fn group_by_database_cluster<S: HitStatistics>(
    hits: Vec<HitRecord<S>>,
) -> Result<ClusterGroups<S>> {
    let mut groups: ClusterGroups<S> = IndexMap::new();
    for hit in hits {
        let key = hit.stats().subject().cluster_key()?.to_string();
        groups.entry(key).or_default().push(hit);
    }
    log::debug!("{} cluster(s) with hits", groups.len());
    Ok(groups)
}
