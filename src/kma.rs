/// K-mer alignment (KMA) hits
///
/// KMA maps raw reads straight against the database and reports one line per
/// template in its `.res` table. There is no query position and no gap count,
/// so the aligned length is recovered from the template coverage.
use std::io::BufRead;
use std::str::FromStr;
use std::path::Path;

use crate::blast_tabular::open_input;
use crate::error::{HitError, Result};
use crate::hit::{HitRecord, HitStatistics};
use crate::subject::SubjectId;

pub const KMA_TEMPLATE: &str = "#Template";
pub const KMA_SCORE: &str = "Score";
pub const KMA_TEMPLATE_LENGTH: &str = "Template_length";
pub const KMA_TEMPLATE_IDENTITY: &str = "Template_Identity";
pub const KMA_TEMPLATE_COVERAGE: &str = "Template_Coverage";
pub const KMA_DEPTH: &str = "Depth";

/// Hit detected by KMA on raw reads
pub type KmaHit = HitRecord<KmaStatistics>;

#[derive(Debug, Clone, PartialEq)]
pub struct KmaStatistics {
    subject: SubjectId,
    score: u64,
    template_length: u64,
    percent_identity: f64,
    subject_coverage: f64,
    depth: f64,
}

impl KmaStatistics {
    pub fn new(
        subject_id: impl Into<String>,
        score: u64,
        template_length: u64,
        percent_identity: f64,
        subject_coverage: f64,
        depth: f64,
    ) -> Result<Self> {
        if template_length < 1 {
            return Err(HitError::InvalidStatistics(
                "template length must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&percent_identity) {
            return Err(HitError::InvalidStatistics(format!(
                "percent identity {percent_identity} outside [0, 100]"
            )));
        }
        // KMA reports coverage above 100% when reads extend past the template
        if subject_coverage < 0.0 {
            return Err(HitError::InvalidStatistics(format!(
                "negative coverage {subject_coverage}"
            )));
        }

        Ok(KmaStatistics {
            subject: SubjectId::new(subject_id),
            score,
            template_length,
            percent_identity,
            subject_coverage,
            depth,
        })
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }
}

impl HitStatistics for KmaStatistics {
    fn subject(&self) -> &SubjectId {
        &self.subject
    }

    fn subject_length(&self) -> u64 {
        self.template_length
    }

    fn alignment_length(&self) -> u64 {
        let covered = self.subject_coverage.min(100.0) / 100.0;
        (self.template_length as f64 * covered).round() as u64
    }

    fn percent_identity(&self) -> f64 {
        self.percent_identity
    }

    fn subject_coverage(&self) -> f64 {
        self.subject_coverage
    }

    fn is_full_length(&self) -> bool {
        self.subject_coverage == 100.0
    }

    fn is_perfect_hit(&self) -> bool {
        self.is_full_length() && self.percent_identity == 100.0
    }

    fn length_score(&self) -> i64 {
        self.template_length as i64 - self.alignment_length() as i64
    }

    fn statistic_columns(&self) -> &'static [&'static str] {
        &["Length", "% Identity", "% Covered", "Depth"]
    }

    fn statistic_values(&self) -> Vec<String> {
        vec![
            self.template_length.to_string(),
            format!("{:.2}", self.percent_identity),
            format!("{:.2}", self.subject_coverage),
            format!("{:.2}", self.depth),
        ]
    }
}

/// Read a KMA `.res` table (plain or gzipped)
pub fn read_kma_results<P: AsRef<Path>>(path: P) -> Result<Vec<KmaHit>> {
    let reader = open_input(path)?;
    parse_kma_results(reader)
}

/// Parse KMA results; columns are located through the `#Template` header line
pub fn parse_kma_results<R: BufRead>(reader: R) -> Result<Vec<KmaHit>> {
    let mut columns: Option<Vec<String>> = None;
    let mut hits = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(KMA_TEMPLATE) {
            columns = Some(line.split('\t').map(|c| c.trim().to_string()).collect());
            continue;
        }

        let header = columns
            .as_ref()
            .ok_or_else(|| HitError::missing(KMA_TEMPLATE))?;
        let fields: Vec<&str> = line.split('\t').collect();

        let stats = KmaStatistics::new(
            column(header, &fields, KMA_TEMPLATE)?,
            parse_column(header, &fields, KMA_SCORE)?,
            parse_column(header, &fields, KMA_TEMPLATE_LENGTH)?,
            parse_column(header, &fields, KMA_TEMPLATE_IDENTITY)?,
            parse_column(header, &fields, KMA_TEMPLATE_COVERAGE)?,
            parse_column(header, &fields, KMA_DEPTH)?,
        )?;
        hits.push(HitRecord::from_stats(stats));
    }

    log::info!("{} KMA hits parsed", hits.len());
    Ok(hits)
}

fn column<'a>(header: &[String], fields: &[&'a str], key: &str) -> Result<&'a str> {
    header
        .iter()
        .position(|c| c == key)
        .and_then(|idx| fields.get(idx))
        .map(|v| v.trim())
        .ok_or_else(|| HitError::missing(key))
}

fn parse_column<T: FromStr>(header: &[String], fields: &[&str], key: &str) -> Result<T> {
    let raw = column(header, fields, key)?;
    raw.parse::<T>().map_err(|_| HitError::invalid(key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RES: &str = "#Template\tScore\tExpected\tTemplate_length\tTemplate_Identity\tTemplate_Coverage\tQuery_Identity\tQuery_Coverage\tDepth\tq_value\tp_value\n\
2__blaCTX-M__seq_15__seq_15\t81234\t52\t876\t100.00\t100.00\t100.00\t100.00\t92.71\t81000.1\t1.0e-26\n\
7__tet(A)__seq_3__seq_3\t40000\t30\t1200\t98.75\t95.50\t98.75\t95.50\t30.10\t39000.0\t1.0e-26\n";

    #[test]
    fn test_parse_kma_results() {
        let hits = parse_kma_results(Cursor::new(RES)).unwrap();
        assert_eq!(hits.len(), 2);

        let first = &hits[0];
        assert_eq!(first.locus(), "seq_15");
        assert_eq!(first.db_cluster(), "blaCTX-M");
        assert!(first.stats().is_perfect_hit());
        assert_eq!(first.stats().score(), 81234);

        let second = hits[1].stats();
        assert!(!second.is_full_length());
        assert_eq!(second.alignment_length(), 1146);
        assert_eq!(second.length_score(), 54);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let res = "#Template\tScore\tTemplate_length\tTemplate_Identity\tDepth\n\
0__geneX__a1__1\t10\t100\t99.0\t5.0\n";
        match parse_kma_results(Cursor::new(res)) {
            Err(HitError::MalformedRecord { field }) => assert_eq!(field, KMA_TEMPLATE_COVERAGE),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_kma_table_row() {
        let stats = KmaStatistics::new("1__sul1__seq_2__seq_2", 500, 840, 99.5, 100.0, 12.346).unwrap();
        let hit = HitRecord::from_stats(stats);
        assert_eq!(
            hit.table_column_names(),
            vec!["DB_cluster", "Locus", "Length", "% Identity", "% Covered", "Depth", "Accession"]
        );
        assert_eq!(
            hit.to_table_row(),
            vec!["sul1", "seq_2", "840", "99.50", "100.00", "12.35", "-"]
        );
    }
}
