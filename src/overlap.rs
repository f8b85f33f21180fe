/// Spatial clustering of hits on the query sequence
///
/// Two hits overlap when they sit on the same query sequence and share at
/// least one position. Used by the typing workflow where the gene family of a
/// hit is not known up front.
use std::collections::HashMap;
use std::ops::Range;

use crate::hit::QueryAligned;
use crate::union_find::UnionFind;

/// Union of half-open intervals, kept sorted and disjoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoveredPositions {
    ranges: Vec<Range<u64>>,
}

impl CoveredPositions {
    pub fn from_interval(interval: Range<u64>) -> Self {
        let mut covered = CoveredPositions::default();
        covered.insert(interval);
        covered
    }

    /// True if any position of `interval` is covered
    pub fn intersects(&self, interval: &Range<u64>) -> bool {
        if interval.is_empty() {
            return false;
        }
        // First stored range ending after the interval start
        let idx = self.ranges.partition_point(|r| r.end <= interval.start);
        self.ranges
            .get(idx)
            .map(|r| r.start < interval.end)
            .unwrap_or(false)
    }

    pub fn insert(&mut self, interval: Range<u64>) {
        if interval.is_empty() {
            return;
        }
        let mut merged = interval;
        let first = self.ranges.partition_point(|r| r.end < merged.start);
        let mut last = first;
        while last < self.ranges.len() && self.ranges[last].start <= merged.end {
            merged.start = merged.start.min(self.ranges[last].start);
            merged.end = merged.end.max(self.ranges[last].end);
            last += 1;
        }
        self.ranges.splice(first..last, std::iter::once(merged));
    }

    pub fn ranges(&self) -> &[Range<u64>] {
        &self.ranges
    }

    /// Number of covered positions
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(|r| r.end - r.start).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Group of overlapping hits on one query sequence
#[derive(Debug, Clone)]
pub struct OverlapCluster<H> {
    query_id: String,
    covered: CoveredPositions,
    hits: Vec<H>,
}

impl<H: QueryAligned> OverlapCluster<H> {
    pub fn new(seed: H) -> Self {
        OverlapCluster {
            query_id: seed.query_id().to_string(),
            covered: CoveredPositions::from_interval(seed.query_interval()),
            hits: vec![seed],
        }
    }

    pub fn overlaps(&self, hit: &H) -> bool {
        hit.query_id() == self.query_id && self.covered.intersects(&hit.query_interval())
    }

    pub fn add_hit(&mut self, hit: H) {
        self.covered.insert(hit.query_interval());
        self.hits.push(hit);
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn covered(&self) -> &CoveredPositions {
        &self.covered
    }

    /// Members in discovery order
    pub fn hits(&self) -> &[H] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<H> {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Cluster hits in a single pass per seed.
///
/// The first remaining hit seeds a cluster; the other remaining hits are
/// scanned once in order and join when they overlap the positions covered so
/// far. A hit that would only overlap through a member found later in the
/// same scan stays out and seeds or joins a later cluster.
pub fn cluster_overlapping<H: QueryAligned>(hits: Vec<H>) -> Vec<OverlapCluster<H>> {
    let mut clusters = Vec::new();
    let mut remaining = hits;

    loop {
        let mut rest = remaining.into_iter();
        let Some(seed) = rest.next() else {
            break;
        };

        let mut cluster = OverlapCluster::new(seed);
        let mut leftover = Vec::new();
        for hit in rest {
            if cluster.overlaps(&hit) {
                cluster.add_hit(hit);
            } else {
                leftover.push(hit);
            }
        }

        clusters.push(cluster);
        remaining = leftover;
    }

    log_clusters(&clusters);
    clusters
}

/// Cluster hits by the full transitive closure of overlaps.
///
/// Clusters are ordered by their earliest input hit and members keep input
/// order. Never yields more clusters than [`cluster_overlapping`].
pub fn cluster_overlapping_transitive<H: QueryAligned>(hits: Vec<H>) -> Vec<OverlapCluster<H>> {
    let mut uf = UnionFind::new(hits.len());

    {
        let mut by_query: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, hit) in hits.iter().enumerate() {
            by_query.entry(hit.query_id()).or_default().push(idx);
        }

        for indices in by_query.values_mut() {
            indices.sort_by_key(|&idx| hits[idx].query_interval().start);

            // Sweep by start; a hit joins the running component if it starts
            // before the furthest end seen so far
            let mut current: Option<(usize, u64)> = None;
            for &idx in indices.iter() {
                let interval = hits[idx].query_interval();
                if interval.is_empty() {
                    continue;
                }
                match current {
                    Some((anchor, end)) if interval.start < end => {
                        uf.union(anchor, idx);
                        current = Some((anchor, end.max(interval.end)));
                    }
                    _ => current = Some((idx, interval.end)),
                }
            }
        }
    }

    let sets = uf.sets();
    let mut slots: Vec<Option<H>> = hits.into_iter().map(Some).collect();
    let mut clusters = Vec::with_capacity(sets.len());
    for members in sets {
        let mut members = members.into_iter().filter_map(|idx| slots[idx].take());
        let Some(seed) = members.next() else {
            continue;
        };
        let mut cluster = OverlapCluster::new(seed);
        for hit in members {
            cluster.add_hit(hit);
        }
        clusters.push(cluster);
    }

    log_clusters(&clusters);
    clusters
}

fn log_clusters<H: QueryAligned>(clusters: &[OverlapCluster<H>]) {
    for (i, cluster) in clusters.iter().enumerate() {
        log::debug!("Cluster {} on {}:", i + 1, cluster.query_id());
        for hit in cluster.hits() {
            let interval = hit.query_interval();
            log::debug!("  {}..{}", interval.start, interval.end);
        }
    }
    log::info!("{} clusters of overlapping hits found", clusters.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Span(&'static str, u64, u64);

    impl QueryAligned for Span {
        fn query_id(&self) -> &str {
            self.0
        }

        fn query_interval(&self) -> Range<u64> {
            self.1..self.2
        }
    }

    #[test]
    fn test_covered_positions_merge() {
        let mut covered = CoveredPositions::from_interval(10..20);
        covered.insert(30..40);
        covered.insert(20..25);
        assert_eq!(covered.ranges(), &[10..25, 30..40]);
        covered.insert(5..35);
        assert_eq!(covered.ranges(), &[5..40]);
        assert_eq!(covered.len(), 35);

        assert!(covered.intersects(&(39..50)));
        assert!(!covered.intersects(&(40..50)));
        assert!(!covered.intersects(&(0..5)));
        assert!(!covered.intersects(&(7..7)));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let clusters = cluster_overlapping(vec![Span("c1", 0, 10), Span("c1", 10, 20)]);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_different_queries_never_overlap() {
        let clusters = cluster_overlapping(vec![Span("c1", 0, 10), Span("c2", 0, 10)]);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].query_id(), "c2");
    }

    #[test]
    fn test_single_pass_misses_late_bridge() {
        // The third hit bridges the first two, but the second was scanned
        // before the bridge joined
        let hits = vec![Span("c1", 0, 10), Span("c1", 20, 30), Span("c1", 5, 25)];
        let clusters = cluster_overlapping(hits.clone());
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].hits(), &[Span("c1", 0, 10), Span("c1", 5, 25)]);
        assert_eq!(clusters[1].hits(), &[Span("c1", 20, 30)]);

        let closed = cluster_overlapping_transitive(hits);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].len(), 3);
        assert_eq!(closed[0].covered().ranges(), &[0..30]);
    }

    #[test]
    fn test_transitive_keeps_input_order() {
        let hits = vec![
            Span("c2", 100, 200),
            Span("c1", 50, 60),
            Span("c2", 150, 300),
            Span("c1", 0, 10),
        ];
        let clusters = cluster_overlapping_transitive(hits);
        let layout: Vec<Vec<u64>> = clusters
            .iter()
            .map(|c| c.hits().iter().map(|s| s.1).collect())
            .collect();
        assert_eq!(layout, vec![vec![100, 150], vec![50], vec![0]]);
    }
}
