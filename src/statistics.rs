use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{HitError, Result};
use crate::subject::SubjectId;

/// Gap character in aligned sequences
pub const GAP: u8 = b'-';

/// One parsed alignment row, column key -> raw value
pub type TabularRecord = IndexMap<String, String>;

/// Numeric facts of one BLAST alignment hit
///
/// Coordinates on the query are a half-open interval. The aligned subject
/// sequence carries `-` for every gap opened in the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentStatistics {
    subject: SubjectId,
    subject_length: u64,
    subject_sequence: String,
    query_id: String,
    query_start: u64,
    query_end: u64,
    percent_identity: f64,
}

impl AlignmentStatistics {
    pub fn new(
        subject_id: impl Into<String>,
        subject_length: u64,
        subject_sequence: impl Into<String>,
        query_id: impl Into<String>,
        query_start: u64,
        query_end: u64,
        percent_identity: f64,
    ) -> Result<Self> {
        if subject_length < 1 {
            return Err(HitError::InvalidStatistics(
                "subject length must be at least 1".to_string(),
            ));
        }
        if query_end < query_start {
            return Err(HitError::InvalidStatistics(format!(
                "query end {query_end} precedes query start {query_start}"
            )));
        }
        if !(0.0..=100.0).contains(&percent_identity) {
            return Err(HitError::InvalidStatistics(format!(
                "percent identity {percent_identity} outside [0, 100]"
            )));
        }

        Ok(AlignmentStatistics {
            subject: SubjectId::new(subject_id),
            subject_length,
            subject_sequence: subject_sequence.into(),
            query_id: query_id.into(),
            query_start,
            query_end,
            percent_identity,
        })
    }

    /// Build statistics from a record keyed by BLAST output column names
    /// (`pident sseqid sseq slen qseqid qstart qend`)
    pub fn from_record(record: &TabularRecord) -> Result<Self> {
        let percent_identity: f64 = parse_field(record, "pident")?;
        let subject_id = field(record, "sseqid")?;
        let subject_sequence = field(record, "sseq")?;
        let subject_length: u64 = parse_field(record, "slen")?;
        let query_id = field(record, "qseqid")?;
        let query_start: u64 = parse_field(record, "qstart")?;
        let query_end: u64 = parse_field(record, "qend")?;

        Self::new(
            subject_id,
            subject_length,
            subject_sequence,
            query_id,
            query_start,
            query_end,
            percent_identity,
        )
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn subject_id(&self) -> &str {
        self.subject.as_str()
    }

    pub fn subject_length(&self) -> u64 {
        self.subject_length
    }

    pub fn subject_sequence(&self) -> &str {
        &self.subject_sequence
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn query_start(&self) -> u64 {
        self.query_start
    }

    pub fn query_end(&self) -> u64 {
        self.query_end
    }

    pub fn percent_identity(&self) -> f64 {
        self.percent_identity
    }

    pub fn alignment_length(&self) -> u64 {
        self.subject_sequence.len() as u64
    }

    /// Percentage of the subject spanned by the alignment
    pub fn subject_coverage(&self) -> f64 {
        100.0 * self.alignment_length() as f64 / self.subject_length as f64
    }

    pub fn gaps(&self) -> u64 {
        self.subject_sequence.bytes().filter(|&b| b == GAP).count() as u64
    }

    pub fn is_full_length(&self) -> bool {
        self.subject_length == self.alignment_length()
    }

    pub fn is_perfect_hit(&self) -> bool {
        self.is_full_length() && self.percent_identity == 100.0
    }

    /// QL - HL + G: allele length minus HSP length plus gaps. Lower is better,
    /// 0 for a full-length gapless hit.
    pub fn length_score(&self) -> i64 {
        self.subject_length as i64 - self.alignment_length() as i64 + self.gaps() as i64
    }

    /// `{bases_covered}/{subject_length}`
    pub fn length_statistic(&self) -> String {
        format!("{}/{}", self.alignment_length(), self.subject_length)
    }
}

impl fmt::Display for AlignmentStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}..{} -> {} ({:.2}%, {})",
            self.query_id,
            self.query_start,
            self.query_end,
            self.subject,
            self.percent_identity,
            self.length_statistic()
        )
    }
}

fn field<'a>(record: &'a TabularRecord, key: &str) -> Result<&'a str> {
    record
        .get(key)
        .map(|v| v.as_str())
        .ok_or_else(|| HitError::missing(key))
}

fn parse_field<T: FromStr>(record: &TabularRecord, key: &str) -> Result<T> {
    let value = field(record, key)?;
    value
        .trim()
        .parse::<T>()
        .map_err(|_| HitError::invalid(key, value))
}
