use std::io::Write;

use crate::error::Result;
use crate::hit::{HitRecord, HitStatistics};

/// Write hits as a tab-separated table
///
/// The header comes from the first hit; an empty hit list writes nothing.
pub fn write_hits_tsv<S: HitStatistics, W: Write>(hits: &[HitRecord<S>], writer: &mut W) -> Result<()> {
    let Some(first) = hits.first() else {
        return Ok(());
    };

    writeln!(writer, "{}", first.table_column_names().join("\t"))?;
    for hit in hits {
        writeln!(writer, "{}", hit.to_table_row().join("\t"))?;
    }
    writer.flush()?;
    Ok(())
}
