use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use asmstats::metrics::DEFAULT_WINDOW_SIZE;
use asmstats::report;
use asmstats::run::{run_all, RunConfig};

/// asmstats - Assembly mapping statistics across assemblers
///
/// Computes contiguity, identity, breadth of coverage, C90/C95, N50 and
/// per-contig Phred scores from PAF mappings of each assembler's contigs
/// against a triple-reference FASTA, and prints comparison tables.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Directory with assembly FASTA files (*.fasta)
    #[clap(value_name = "ASSEMBLIES")]
    assemblies: PathBuf,

    /// Directory with PAF mapping files (*.paf)
    #[clap(value_name = "MAPPINGS")]
    mappings: PathBuf,

    /// Triple-reference FASTA file
    #[clap(short = 'r', long = "reference")]
    reference: PathBuf,

    /// Window size for the lowest-identity scan
    #[clap(short = 'w', long = "window", default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    /// Write per-assembler breadth-of-coverage CSV files
    #[clap(long = "print-csv")]
    print_csv: bool,

    /// Write an HTML report with comparison plots to this path
    #[clap(long = "html")]
    html: Option<PathBuf>,

    /// Number of threads for parallel processing
    #[clap(short = 't', long = "threads", default_value = "8")]
    threads: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let config = RunConfig {
        assemblies_dir: args.assemblies,
        mappings_dir: args.mappings,
        reference: args.reference,
        window: args.window,
    };

    let results = run_all(&config)?;
    if results.is_empty() {
        bail!("no assembler produced results");
    }

    print!("{}", report::summary_table(&results));
    println!();
    print!("{}", report::reference_table(&results));
    println!();
    print!("{}", report::phred_table(&results));

    if args.print_csv {
        report::write_coverage_csvs(&results, Path::new("."))?;
    }

    if let Some(path) = &args.html {
        report::write_html_report(path, &results)?;
        info!("wrote report to {}", path.display());
    }

    Ok(())
}
