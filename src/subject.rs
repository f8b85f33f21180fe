/// Structured subject identifiers
///
/// Reference sequences in a gene detection database are named
/// `{cluster_index}__{cluster_name}__{allele_id}__{unique_id}`. The name is
/// parsed once when a hit is ingested and the structured form is carried from
/// there on.
use std::fmt;

use crate::error::{HitError, Result};

pub const SUBJECT_ID_DELIMITER: &str = "__";

/// Gene family and allele encoded in a subject id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectIdentity {
    pub cluster_index: String,
    pub cluster_name: String,
    pub allele_id: String,
    pub unique_id: Option<String>,
}

impl SubjectIdentity {
    /// Parse a subject id; `None` when fewer than three fields are present
    pub fn parse(subject_id: &str) -> Option<Self> {
        let mut parts = subject_id.splitn(4, SUBJECT_ID_DELIMITER);
        let cluster_index = parts.next()?;
        let cluster_name = parts.next()?;
        let allele_id = parts.next()?;
        let unique_id = parts.next().map(str::to_string);

        Some(SubjectIdentity {
            cluster_index: cluster_index.to_string(),
            cluster_name: cluster_name.to_string(),
            allele_id: allele_id.to_string(),
            unique_id,
        })
    }
}

/// Raw subject id together with its parsed identity (if it follows the convention)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectId {
    raw: String,
    identity: Option<SubjectIdentity>,
}

impl SubjectId {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let identity = SubjectIdentity::parse(&raw);
        SubjectId { raw, identity }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn identity(&self) -> Option<&SubjectIdentity> {
        self.identity.as_ref()
    }

    /// Identity required by database-cluster grouping
    pub fn require_identity(&self) -> Result<&SubjectIdentity> {
        self.identity
            .as_ref()
            .ok_or_else(|| HitError::MalformedSubjectId {
                subject_id: self.raw.clone(),
            })
    }

    /// Gene family key (second field)
    pub fn cluster_key(&self) -> Result<&str> {
        Ok(&self.require_identity()?.cluster_name)
    }

    /// Allele id (third field), falling back to the raw id
    pub fn allele_or_raw(&self) -> &str {
        self.identity
            .as_ref()
            .map(|id| id.allele_id.as_str())
            .unwrap_or(&self.raw)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_subject_id() {
        let id = SubjectIdentity::parse("12__blaTEM__seq_42__seq_42").unwrap();
        assert_eq!(id.cluster_index, "12");
        assert_eq!(id.cluster_name, "blaTEM");
        assert_eq!(id.allele_id, "seq_42");
        assert_eq!(id.unique_id.as_deref(), Some("seq_42"));
    }

    #[test]
    fn test_three_fields_are_enough() {
        let id = SubjectIdentity::parse("0__geneX__a1").unwrap();
        assert_eq!(id.cluster_name, "geneX");
        assert_eq!(id.unique_id, None);
    }

    #[test]
    fn test_malformed_subject_id() {
        assert!(SubjectIdentity::parse("0__geneX").is_none());
        assert!(SubjectIdentity::parse("plain_contig_name").is_none());

        let subject = SubjectId::new("0__geneX");
        assert!(matches!(
            subject.cluster_key(),
            Err(HitError::MalformedSubjectId { .. })
        ));
        assert_eq!(subject.allele_or_raw(), "0__geneX");
    }
}
