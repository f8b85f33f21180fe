/// hitclusters - Group BLAST hits by overlap on the query
///
/// Clusters hits that share positions on the same contig and reports, for
/// every cluster, its covered region and the best hit(s) it contains.
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};

use hitselect::blast_tabular::{read_blast_hits, BlastTabularReader};
use hitselect::filter::{filter_by_coverage, filter_by_identity};
use hitselect::overlap::{cluster_overlapping, cluster_overlapping_transitive};
use hitselect::selection::select_best;

#[derive(Parser)]
#[clap(
    name = "hitclusters",
    about = "Cluster overlapping BLAST hits and report the best hit per cluster"
)]
struct Args {
    /// BLAST tabular output, stdin if omitted
    input: Option<String>,

    /// Minimum percent identity
    #[clap(long = "min-identity", default_value = "0.0")]
    min_identity: f64,

    /// Minimum percent coverage of the reference
    #[clap(long = "min-coverage", default_value = "0.0")]
    min_coverage: f64,

    /// Merge clusters through every chain of overlaps instead of one pass per seed
    #[clap(long)]
    transitive: bool,

    /// Increase log verbosity
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose > 0 { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let hits = match args.input {
        Some(ref path) => {
            read_blast_hits(path).with_context(|| format!("Failed to parse '{path}'"))?
        }
        None => BlastTabularReader::new(io::stdin())
            .read_all()
            .context("Failed to parse BLAST output from stdin")?,
    };
    let hits = filter_by_identity(hits, args.min_identity);
    let hits = filter_by_coverage(hits, args.min_coverage);

    let clusters = if args.transitive {
        cluster_overlapping_transitive(hits)
    } else {
        cluster_overlapping(hits)
    };

    let mut out = BufWriter::new(io::stdout());
    writeln!(out, "Cluster\tContig\tRegion\tHits\tBest hit(s)")?;
    for (i, cluster) in clusters.iter().enumerate() {
        let region = cluster
            .covered()
            .ranges()
            .iter()
            .map(|r| format!("{}..{}", r.start, r.end))
            .collect::<Vec<_>>()
            .join(",");
        let best = select_best(cluster.hits())?
            .iter()
            .map(|h| h.stats().subject_id().to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            i + 1,
            cluster.query_id(),
            region,
            cluster.len(),
            best
        )?;
    }
    out.flush()?;

    Ok(())
}
