/// Gene detection hits
///
/// A hit wraps the statistics produced by one alignment tool with the domain
/// identity the rest of the pipeline cares about: the locus name, an optional
/// accession and report metadata. Selection only ever looks at the
/// statistics, through the [`HitStatistics`] capability.
use indexmap::IndexMap;
use std::fmt;
use std::ops::Range;

use crate::statistics::AlignmentStatistics;
use crate::subject::SubjectId;

pub const COLUMN_DB_CLUSTER: &str = "DB_cluster";
pub const COLUMN_LOCUS: &str = "Locus";
pub const COLUMN_ACCESSION: &str = "Accession";

/// Placeholder for empty table cells
pub const MISSING_VALUE: &str = "-";

/// Statistics every hit kind exposes to the selection engine
pub trait HitStatistics {
    fn subject(&self) -> &SubjectId;
    fn subject_length(&self) -> u64;
    fn alignment_length(&self) -> u64;
    fn percent_identity(&self) -> f64;
    fn subject_coverage(&self) -> f64;
    fn is_full_length(&self) -> bool;
    fn is_perfect_hit(&self) -> bool;
    /// Lower is better; 0 for a full-length gapless hit
    fn length_score(&self) -> i64;

    /// Start on the query sequence, when the tool reports one
    fn query_start(&self) -> Option<u64> {
        None
    }

    /// Report columns between `Locus` and `Accession`
    fn statistic_columns(&self) -> &'static [&'static str];
    fn statistic_values(&self) -> Vec<String>;
}

/// Hits positioned on a query sequence
pub trait QueryAligned {
    fn query_id(&self) -> &str;
    fn query_interval(&self) -> Range<u64>;
}

impl HitStatistics for AlignmentStatistics {
    fn subject(&self) -> &SubjectId {
        AlignmentStatistics::subject(self)
    }

    fn subject_length(&self) -> u64 {
        AlignmentStatistics::subject_length(self)
    }

    fn alignment_length(&self) -> u64 {
        AlignmentStatistics::alignment_length(self)
    }

    fn percent_identity(&self) -> f64 {
        AlignmentStatistics::percent_identity(self)
    }

    fn subject_coverage(&self) -> f64 {
        AlignmentStatistics::subject_coverage(self)
    }

    fn is_full_length(&self) -> bool {
        AlignmentStatistics::is_full_length(self)
    }

    fn is_perfect_hit(&self) -> bool {
        AlignmentStatistics::is_perfect_hit(self)
    }

    fn length_score(&self) -> i64 {
        AlignmentStatistics::length_score(self)
    }

    fn query_start(&self) -> Option<u64> {
        Some(AlignmentStatistics::query_start(self))
    }

    fn statistic_columns(&self) -> &'static [&'static str] {
        &["% Identity", "HSP/Locus length", "Contig", "Position in contig"]
    }

    fn statistic_values(&self) -> Vec<String> {
        vec![
            format!("{:.2}", self.percent_identity()),
            self.length_statistic(),
            self.query_id().to_string(),
            format!("{}..{}", self.query_start(), self.query_end()),
        ]
    }
}

impl QueryAligned for AlignmentStatistics {
    fn query_id(&self) -> &str {
        AlignmentStatistics::query_id(self)
    }

    fn query_interval(&self) -> Range<u64> {
        self.query_start()..self.query_end()
    }
}

/// Report classes of a hit (green / light green / grey in reports)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitClass {
    Perfect,
    FullLength,
    Partial,
}

impl HitClass {
    pub fn color(&self) -> &'static str {
        match self {
            HitClass::Perfect => "green",
            HitClass::FullLength => "lightgreen",
            HitClass::Partial => "grey",
        }
    }
}

/// Insertion-ordered report metadata; columns appear in the order added
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: IndexMap<String, String>,
}

impl Metadata {
    /// Append an entry. An existing name keeps its first value and position.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, value.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|v| v.as_str())
    }
}

/// A gene detection hit of statistics kind `S`
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord<S> {
    stats: S,
    locus: String,
    accession: Option<String>,
    metadata: Metadata,
}

/// Hit detected by BLAST on an assembly
pub type BlastHit = HitRecord<AlignmentStatistics>;

impl<S: HitStatistics> HitRecord<S> {
    pub fn new(locus: impl Into<String>, accession: Option<String>, stats: S) -> Self {
        HitRecord {
            stats,
            locus: locus.into(),
            accession,
            metadata: Metadata::default(),
        }
    }

    /// Hit whose locus is the allele id of its subject
    pub fn from_stats(stats: S) -> Self {
        let locus = stats.subject().allele_or_raw().to_string();
        Self::new(locus, None, stats)
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    pub fn locus(&self) -> &str {
        &self.locus
    }

    pub fn set_locus(&mut self, locus: impl Into<String>) {
        self.locus = locus.into();
    }

    pub fn accession(&self) -> Option<&str> {
        self.accession.as_deref()
    }

    pub fn set_accession(&mut self, accession: impl Into<String>) {
        self.accession = Some(accession.into());
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn add_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        self.metadata.add(name, value)
    }

    pub fn class(&self) -> HitClass {
        if self.stats.is_perfect_hit() {
            HitClass::Perfect
        } else if self.stats.is_full_length() {
            HitClass::FullLength
        } else {
            HitClass::Partial
        }
    }

    /// Gene family name, `-` for subjects outside the naming convention
    pub fn db_cluster(&self) -> &str {
        self.stats
            .subject()
            .identity()
            .map(|id| id.cluster_name.as_str())
            .unwrap_or(MISSING_VALUE)
    }

    /// Column names of the tabular projection; metadata sits before `Accession`
    pub fn table_column_names(&self) -> Vec<String> {
        let mut columns = vec![COLUMN_DB_CLUSTER.to_string(), COLUMN_LOCUS.to_string()];
        columns.extend(self.stats.statistic_columns().iter().map(|c| c.to_string()));
        columns.extend(self.metadata.names().map(str::to_string));
        columns.push(COLUMN_ACCESSION.to_string());
        columns
    }

    pub fn to_table_row(&self) -> Vec<String> {
        let mut row = vec![self.db_cluster().to_string(), self.locus.clone()];
        row.extend(self.stats.statistic_values());
        row.extend(self.metadata.values().map(str::to_string));
        row.push(self.accession().unwrap_or(MISSING_VALUE).to_string());
        row
    }
}

impl<S: QueryAligned> QueryAligned for HitRecord<S> {
    fn query_id(&self) -> &str {
        self.stats.query_id()
    }

    fn query_interval(&self) -> Range<u64> {
        self.stats.query_interval()
    }
}

impl<S: fmt::Display> fmt::Display for HitRecord<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.locus, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blast_hit(identity: f64, aligned: usize) -> BlastHit {
        let stats = AlignmentStatistics::new(
            "4__aac(6')-Ib__seq_9__seq_9",
            100,
            "A".repeat(aligned),
            "contig_2",
            1000,
            1000 + aligned as u64,
            identity,
        )
        .unwrap();
        HitRecord::from_stats(stats)
    }

    #[test]
    fn test_locus_defaults_to_allele() {
        let hit = blast_hit(100.0, 100);
        assert_eq!(hit.locus(), "seq_9");
        assert_eq!(hit.db_cluster(), "aac(6')-Ib");
        assert_eq!(hit.class(), HitClass::Perfect);
    }

    #[test]
    fn test_hit_classes() {
        assert_eq!(blast_hit(99.0, 100).class(), HitClass::FullLength);
        assert_eq!(blast_hit(100.0, 80).class(), HitClass::Partial);
        assert_eq!(HitClass::Partial.color(), "grey");
    }

    #[test]
    fn test_table_projection_inserts_metadata_before_accession() {
        let mut hit = blast_hit(97.5, 90);
        hit.set_locus("aac(6')-Ib-cr");
        hit.add_metadata("Phenotype", "aminoglycoside");
        hit.add_metadata("Class", "AMR");

        assert_eq!(
            hit.table_column_names(),
            vec![
                "DB_cluster",
                "Locus",
                "% Identity",
                "HSP/Locus length",
                "Contig",
                "Position in contig",
                "Phenotype",
                "Class",
                "Accession",
            ]
        );
        assert_eq!(
            hit.to_table_row(),
            vec![
                "aac(6')-Ib",
                "aac(6')-Ib-cr",
                "97.50",
                "90/100",
                "contig_2",
                "1000..1090",
                "aminoglycoside",
                "AMR",
                "-",
            ]
        );
    }

    #[test]
    fn test_metadata_keeps_first_entry() {
        let mut metadata = Metadata::default();
        assert!(metadata.add("a", "1"));
        assert!(metadata.add("b", "2"));
        assert!(!metadata.add("a", "3"));
        assert_eq!(metadata.get("a"), Some("1"));
        assert_eq!(metadata.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
