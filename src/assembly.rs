//! Assembly indexing: classify each contig of an assembly as mapped or
//! unmapped by cross-referencing the assembler's alignment records.

use std::path::Path;

use indexmap::IndexMap;

use crate::fasta::{FastaError, FastaScanner};
use crate::metrics;
use crate::paf::AlignmentRecord;

/// One contig of an assembly.
#[derive(Debug, Clone)]
pub struct Contig {
    pub name: String,
    pub length: u64,
    /// Target reference of the contig's first alignment record; `None` when
    /// the contig never appears in the mapping file.
    pub reference: Option<String>,
}

impl Contig {
    pub fn is_mapped(&self) -> bool {
        self.reference.is_some()
    }
}

/// One assembler's full contig set, unmapped contigs included. Filtering
/// them out is a reporting choice, not done here.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub assembler: String,
    pub contigs: Vec<Contig>,
}

/// Whole-assembly summary statistics.
#[derive(Debug, Clone)]
pub struct AssemblySummary {
    pub contigs: usize,
    pub total_bases: u64,
    pub max_contig: u64,
    pub n50: u64,
    pub mapped_contig_fraction: f64,
    pub mapped_base_fraction: f64,
}

impl Assembly {
    pub fn summary(&self) -> AssemblySummary {
        let lengths: Vec<u64> = self.contigs.iter().map(|c| c.length).collect();
        let total_bases: u64 = lengths.iter().sum();
        let mapped_contigs = self.contigs.iter().filter(|c| c.is_mapped()).count();
        let mapped_bases: u64 = self
            .contigs
            .iter()
            .filter(|c| c.is_mapped())
            .map(|c| c.length)
            .sum();

        AssemblySummary {
            contigs: self.contigs.len(),
            total_bases,
            max_contig: lengths.iter().copied().max().unwrap_or(0),
            n50: metrics::n50(&lengths),
            mapped_contig_fraction: if self.contigs.is_empty() {
                0.0
            } else {
                mapped_contigs as f64 / self.contigs.len() as f64
            },
            mapped_base_fraction: if total_bases == 0 {
                0.0
            } else {
                mapped_bases as f64 / total_bases as f64
            },
        }
    }
}

/// Contig name to the reference of its first alignment record, in record
/// order. A contig is mapped when it appears here, regardless of reference.
pub fn mapped_contig_references(records: &[AlignmentRecord]) -> IndexMap<&str, &str> {
    let mut references = IndexMap::new();
    for record in records {
        references
            .entry(record.contig_name.as_str())
            .or_insert(record.ref_name.as_str());
    }
    references
}

/// Cross-reference one assembler's assembly file against its alignment
/// records.
pub fn index_assembly(
    assembler: &str,
    fasta_path: &Path,
    records: &[AlignmentRecord],
) -> Result<Assembly, FastaError> {
    let references = mapped_contig_references(records);

    let mut contigs = Vec::new();
    for seq in FastaScanner::open(fasta_path)? {
        let seq = seq?;
        let reference = references.get(seq.name.as_str()).map(|r| (*r).to_string());
        contigs.push(Contig {
            name: seq.name,
            length: seq.length,
            reference,
        });
    }

    Ok(Assembly {
        assembler: assembler.to_string(),
        contigs,
    })
}
