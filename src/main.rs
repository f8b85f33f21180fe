use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use hitselect::blast_tabular::{read_blast_hits, BlastTabularReader};
use hitselect::kma::read_kma_results;
use hitselect::mapping::{annotate_hits, ExtraColumn, SequenceMapping};
use hitselect::report::write_hits_tsv;
use hitselect::selection::select_hits;
use hitselect::{HitRecord, HitStatistics, SelectionConfig, SelectionMode};

fn parse_extra_column(s: &str) -> Result<ExtraColumn, String> {
    ExtraColumn::parse(s).map_err(|e| e.to_string())
}

/// hitselect - Report the best gene detection hits
///
/// Filters BLAST (or KMA) hits against a gene detection database on identity
/// and coverage, then keeps the best hit(s) per gene family or the top N hits.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// BLAST tabular output ('-outfmt "7 pident sseqid sseq slen qseqid qstart qend"'), stdin if omitted
    #[clap(short = 'i', long = "input")]
    input: Option<String>,

    /// KMA results table (.res) instead of BLAST output
    #[clap(long = "kma", conflicts_with = "input")]
    kma: Option<String>,

    /// Output TSV file (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// Minimum percent identity
    #[clap(long = "min-identity", default_value = "90.0")]
    min_identity: f64,

    /// Minimum percent of the reference allele covered by the alignment
    #[clap(long = "min-coverage", default_value = "60.0")]
    min_coverage: f64,

    /// Selection method: best hit(s) per database cluster, or top N by score
    #[clap(long = "method", value_enum, default_value = "cluster")]
    method: SelectionMode,

    /// Number of hits to keep with '--method score'
    #[clap(short = 'n', long = "top-n")]
    top_n: Option<usize>,

    /// Database mapping (JSON) to translate sequence ids back to allele names
    #[clap(short = 'm', long = "mapping")]
    mapping: Option<String>,

    /// Metadata key holding the accession (requires --mapping)
    #[clap(long = "accession-key", requires = "mapping")]
    accession_key: Option<String>,

    /// Extra report column from the sequence metadata, as NAME:KEY (requires --mapping)
    #[clap(long = "extra-column", requires = "mapping", value_parser = parse_extra_column)]
    extra_column: Option<ExtraColumn>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[clap(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,

    /// Number of threads for per-cluster selection
    #[clap(short = 't', long = "threads", default_value = "1")]
    threads: usize,
}

impl Args {
    fn selection_config(&self) -> SelectionConfig {
        SelectionConfig {
            min_percent_identity: self.min_identity,
            min_coverage: self.min_coverage,
            mode: self.method,
            top_n: self.top_n,
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run<S>(mut hits: Vec<HitRecord<S>>, args: &Args) -> Result<()>
where
    S: HitStatistics + Clone + Send + Sync,
{
    let config = args.selection_config();
    hits = select_hits(hits, &config)?;
    log::info!("{} hit(s) selected", hits.len());

    if let Some(ref path) = args.mapping {
        let mapping = SequenceMapping::from_path(path)
            .with_context(|| format!("Failed to read database mapping '{path}'"))?;
        annotate_hits(
            &mut hits,
            &mapping,
            args.accession_key.as_deref(),
            args.extra_column.as_ref(),
        )?;
    }

    let mut writer: Box<dyn Write> = match args.output {
        Some(ref path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create '{path}'"))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    write_hits_tsv(&hits, &mut writer)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.max(1))
        .build_global()
        .context("Failed to initialise thread pool")?;

    log::info!(
        "Min. percent identity: {}%, min. coverage: {}%",
        args.min_identity,
        args.min_coverage
    );

    if let Some(ref path) = args.kma {
        let hits = read_kma_results(path).with_context(|| format!("Failed to parse '{path}'"))?;
        return run(hits, &args);
    }

    let hits = match args.input {
        Some(ref path) => {
            read_blast_hits(path).with_context(|| format!("Failed to parse '{path}'"))?
        }
        None => BlastTabularReader::new(io::stdin())
            .read_all()
            .context("Failed to parse BLAST output from stdin")?,
    };
    run(hits, &args)
}
