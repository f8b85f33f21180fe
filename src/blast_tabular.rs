use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{HitError, Result};
use crate::hit::{BlastHit, HitRecord};
use crate::statistics::{AlignmentStatistics, TabularRecord};

/// Columns requested from BLAST with `-outfmt "7 pident sseqid sseq slen qseqid qstart qend"`
pub const BLAST_OUTPUT_COLUMNS: [&str; 7] =
    ["pident", "sseqid", "sseq", "slen", "qseqid", "qstart", "qend"];

/// Value to pass to BLAST's `-outfmt` option
pub fn blast_output_format() -> String {
    format!("7 {}", BLAST_OUTPUT_COLUMNS.join(" "))
}

/// Open a file, transparently decompressing `.gz`/`.bgz` inputs
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz" || ext == "bgz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reader for BLAST tabular output (formats 6 and 7)
///
/// Comment lines (`# BLASTN 2.x`, `# Fields: ...`, `# N hits found`) and
/// blank lines are skipped; every other line is one hit.
pub struct BlastTabularReader<R: Read> {
    reader: BufReader<R>,
    columns: Vec<String>,
    line_number: usize,
}

impl<R: Read> BlastTabularReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_columns(reader, &BLAST_OUTPUT_COLUMNS)
    }

    /// Reader for a custom `-outfmt` column list
    pub fn with_columns(reader: R, columns: &[&str]) -> Self {
        BlastTabularReader {
            reader: BufReader::new(reader),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            line_number: 0,
        }
    }

    /// Next record keyed by column name, `None` at end of input
    pub fn read_record(&mut self) -> Result<Option<TabularRecord>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return Ok(Some(self.parse_line(trimmed)?));
        }
    }

    fn parse_line(&self, line: &str) -> Result<TabularRecord> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < self.columns.len() {
            log::debug!(
                "Line {} has {} of {} columns",
                self.line_number,
                fields.len(),
                self.columns.len()
            );
            return Err(HitError::missing(&self.columns[fields.len()]));
        }

        Ok(self
            .columns
            .iter()
            .zip(fields)
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect())
    }

    /// Next hit, with the locus set to the allele id of the subject
    pub fn read_hit(&mut self) -> Result<Option<BlastHit>> {
        match self.read_record()? {
            Some(record) => {
                let stats = AlignmentStatistics::from_record(&record)?;
                Ok(Some(HitRecord::from_stats(stats)))
            }
            None => Ok(None),
        }
    }

    pub fn read_all(&mut self) -> Result<Vec<BlastHit>> {
        let mut hits = Vec::new();
        while let Some(hit) = self.read_hit()? {
            hits.push(hit);
        }
        log::info!("{} hits parsed", hits.len());
        Ok(hits)
    }
}

/// Read BLAST hits from a file (auto-detects gzip compression)
pub fn read_blast_hits<P: AsRef<Path>>(path: P) -> Result<Vec<BlastHit>> {
    let input = open_input(path)?;
    let mut reader = BlastTabularReader::new(input);
    reader.read_all()
}
