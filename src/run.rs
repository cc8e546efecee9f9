//! Whole-run orchestration: discover inputs, process assemblers in
//! parallel, and collect per-assembler results.
//!
//! Each assembler is independent; a failure (missing mapping file,
//! unreadable assembly) is logged and that assembler is dropped from the
//! results, never aborting the rest of the run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{error, info};
use rayon::prelude::*;

use crate::assembly::{index_assembly, Assembly, AssemblySummary};
use crate::fasta::{FastaError, FastaScanner};
use crate::inputs::{discover_assemblies, discover_mappings, find_mapping};
use crate::metrics::{reference_metrics, ReferenceMetrics};
use crate::paf::read_records;

/// One reference genome: name and true (single-copy) length.
#[derive(Debug, Clone)]
pub struct Reference {
    pub name: String,
    pub true_len: u64,
}

pub struct RunConfig {
    pub assemblies_dir: PathBuf,
    pub mappings_dir: PathBuf,
    pub reference: PathBuf,
    pub window: usize,
}

/// Everything computed for one assembler.
pub struct AssemblerResults {
    pub assembly: Assembly,
    pub summary: AssemblySummary,
    pub references: Vec<ReferenceMetrics>,
}

impl AssemblerResults {
    pub fn assembler(&self) -> &str {
        &self.assembly.assembler
    }
}

/// Load the triplicated reference file. Stored lengths are divided by three
/// to recover true lengths. A record with an empty sequence block is
/// reported and skipped so one bad reference does not take down the others.
pub fn load_references(path: &Path) -> Result<Vec<Reference>> {
    let scanner = FastaScanner::open(path)
        .with_context(|| format!("failed to open reference file {}", path.display()))?;

    let mut references = Vec::new();
    for seq in scanner {
        match seq {
            Ok(seq) => references.push(Reference {
                name: seq.name,
                true_len: seq.length / 3,
            }),
            Err(e @ FastaError::EmptySequence(_)) => {
                error!("{}: skipping reference: {e}", path.display());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        }
    }
    Ok(references)
}

fn process_assembler(
    assembler: &str,
    assembly_path: &Path,
    mappings: &[PathBuf],
    references: &[Reference],
    window: usize,
) -> Result<AssemblerResults> {
    let mapping_path = find_mapping(mappings, assembler)?;
    let records = read_records(mapping_path)
        .with_context(|| format!("failed to read mapping file {}", mapping_path.display()))?;
    let assembly = index_assembly(assembler, assembly_path, &records)
        .with_context(|| format!("failed to read assembly {}", assembly_path.display()))?;
    let summary = assembly.summary();

    let per_reference = references
        .iter()
        .map(|r| reference_metrics(&records, &r.name, r.true_len, window))
        .collect();

    Ok(AssemblerResults {
        assembly,
        summary,
        references: per_reference,
    })
}

/// Process every assembler found in the assemblies directory.
pub fn run_all(config: &RunConfig) -> Result<Vec<AssemblerResults>> {
    let references = load_references(&config.reference)?;
    if references.is_empty() {
        bail!("no usable references in {}", config.reference.display());
    }

    let assemblies = discover_assemblies(&config.assemblies_dir)?;
    if assemblies.is_empty() {
        bail!(
            "no assembly files (*.fasta) in {}",
            config.assemblies_dir.display()
        );
    }
    let mappings = discover_mappings(&config.mappings_dir)?;

    info!(
        "{} references, {} assemblers",
        references.len(),
        assemblies.len()
    );

    let mut results: Vec<AssemblerResults> = assemblies
        .par_iter()
        .filter_map(|(assembler, path)| {
            match process_assembler(assembler, path, &mappings, &references, config.window) {
                Ok(results) => Some(results),
                Err(e) => {
                    error!("skipping assembler {assembler}: {e:#}");
                    None
                }
            }
        })
        .collect();

    // Completion order depends on the thread pool.
    results.sort_by(|a, b| a.assembly.assembler.cmp(&b.assembly.assembler));
    Ok(results)
}
