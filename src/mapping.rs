/// Mapping of database sequence ids to their original FASTA headers
///
/// Database construction renames every reference sequence to `seq_N` and
/// stores the original header (`{name} {json metadata}`) in a JSON object.
/// Selected hits are translated back through it for reporting.
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::blast_tabular::open_input;
use crate::error::{HitError, Result};
use crate::hit::{HitRecord, HitStatistics};

#[derive(Clone)]
pub struct SequenceMapping {
    content: HashMap<String, String>,
}

/// Extra report column taken from the sequence metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraColumn {
    pub name: String,
    pub key: String,
}

impl ExtraColumn {
    /// Parse `NAME:KEY`
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once(':') {
            Some((name, key)) if !name.is_empty() && !key.is_empty() => Ok(ExtraColumn {
                name: name.to_string(),
                key: key.to_string(),
            }),
            _ => Err(HitError::InvalidParameter(format!(
                "Badly formatted extra column '{value}', expected NAME:KEY"
            ))),
        }
    }
}

impl SequenceMapping {
    pub fn new(content: HashMap<String, String>) -> Self {
        SequenceMapping { content }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = open_input(path)?;
        let content: HashMap<String, String> = serde_json::from_reader(reader)?;
        Ok(SequenceMapping { content })
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Full original header
    pub fn header(&self, seq_id: &str) -> Result<&str> {
        self.content
            .get(seq_id)
            .map(|h| h.as_str())
            .ok_or_else(|| HitError::UnknownSequence(seq_id.to_string()))
    }

    /// Original sequence name (first token of the header)
    pub fn name(&self, seq_id: &str) -> Result<&str> {
        let header = self.header(seq_id)?;
        Ok(header.split(' ').next().unwrap_or(header))
    }

    /// JSON metadata following the name in the header
    pub fn metadata(&self, seq_id: &str) -> Result<Map<String, Value>> {
        let header = self.header(seq_id)?;
        let json = header.split_once(' ').map(|(_, rest)| rest).unwrap_or("{}");
        Ok(serde_json::from_str(json)?)
    }

    /// Metadata value for `key`, or `default` when absent
    pub fn metadata_value(&self, seq_id: &str, key: &str, default: Option<&str>) -> Result<String> {
        let metadata = self.metadata(seq_id)?;
        match metadata.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => default.map(str::to_string).ok_or_else(|| {
                HitError::MissingMetadata {
                    seq_id: seq_id.to_string(),
                    key: key.to_string(),
                }
            }),
            Some(other) => Ok(other.to_string()),
        }
    }
}

impl fmt::Debug for SequenceMapping {
    // Mappings hold the whole database; keep logs readable
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceMapping({} items)", self.content.len())
    }
}

/// Translate selected hits back to their original sequence names
///
/// The locus becomes the original name of the allele, the accession is read
/// from `accession_key` (when given and present) and `extra_column` appends
/// one metadata column (`-` when the key is absent).
pub fn annotate_hits<S: HitStatistics>(
    hits: &mut [HitRecord<S>],
    mapping: &SequenceMapping,
    accession_key: Option<&str>,
    extra_column: Option<&ExtraColumn>,
) -> Result<()> {
    for hit in hits.iter_mut() {
        let seq_id = hit.stats().subject().allele_or_raw().to_string();
        hit.set_locus(mapping.name(&seq_id)?);

        if let Some(key) = accession_key {
            let accession = mapping.metadata_value(&seq_id, key, Some(""))?;
            if !accession.is_empty() {
                hit.set_accession(accession);
            }
        }

        if let Some(column) = extra_column {
            let value = mapping.metadata_value(&seq_id, &column.key, Some("-"))?;
            hit.add_metadata(column.name.clone(), value);
        }
    }
    log::debug!("{} hit(s) annotated from {:?}", hits.len(), mapping);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::AlignmentStatistics;

    fn mapping() -> SequenceMapping {
        let mut content = HashMap::new();
        content.insert(
            "seq_1".to_string(),
            r#"blaTEM-1_1_AY458016 {"allele": "blaTEM-1_1_AY458016", "accession": "AY458016", "class": "beta-lactam"}"#
                .to_string(),
        );
        content.insert("seq_2".to_string(), "sul1_5 {}".to_string());
        SequenceMapping::new(content)
    }

    #[test]
    fn test_header_lookup() {
        let mapping = mapping();
        assert_eq!(mapping.name("seq_1").unwrap(), "blaTEM-1_1_AY458016");
        assert_eq!(
            mapping.metadata_value("seq_1", "class", None).unwrap(),
            "beta-lactam"
        );
        assert_eq!(mapping.metadata_value("seq_2", "class", Some("n/a")).unwrap(), "n/a");
        assert!(matches!(
            mapping.metadata_value("seq_2", "class", None),
            Err(HitError::MissingMetadata { .. })
        ));
        assert!(matches!(mapping.header("seq_3"), Err(HitError::UnknownSequence(_))));
        assert_eq!(format!("{mapping:?}"), "SequenceMapping(2 items)");
    }

    #[test]
    fn test_annotate_hits() {
        let stats =
            AlignmentStatistics::new("0__blaTEM__seq_1__seq_1", 4, "ACGT", "NODE_3", 7, 11, 100.0)
                .unwrap();
        let mut hits = vec![HitRecord::from_stats(stats)];
        let column = ExtraColumn::parse("Class:class").unwrap();

        annotate_hits(&mut hits, &mapping(), Some("accession"), Some(&column)).unwrap();

        let hit = &hits[0];
        assert_eq!(hit.locus(), "blaTEM-1_1_AY458016");
        assert_eq!(hit.accession(), Some("AY458016"));
        assert_eq!(hit.metadata().get("Class"), Some("beta-lactam"));
        assert_eq!(hit.table_column_names()[6], "Class");
    }

    #[test]
    fn test_extra_column_parse() {
        assert!(ExtraColumn::parse("Phenotype").is_err());
        assert!(ExtraColumn::parse(":key").is_err());
        assert_eq!(ExtraColumn::parse("A:b").unwrap().key, "b");
    }
}
