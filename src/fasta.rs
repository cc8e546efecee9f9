//! FASTA scanning for reference and assembly files.
//!
//! Only names and sequence lengths are consumed downstream, so records are
//! reduced to `(name, length)` pairs. Supports plain and gzip-compressed
//! input (`.gz`, `.bgz`).

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FastaError {
    #[error("failed to read sequence file")]
    Io(#[from] std::io::Error),
    /// A header with no sequence lines before EOF or the next header.
    #[error("empty sequence block for record '{0}'")]
    EmptySequence(String),
}

/// One FASTA record, reduced to its name and sequence length.
///
/// The name is the first whitespace-delimited token after `>`; the length
/// counts the concatenation of all sequence lines, per-line trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaSeq {
    pub name: String,
    pub length: u64,
}

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a FASTA file, auto-detecting gzip compression by extension.
pub fn open_fasta_input(path: &Path) -> Result<Box<dyn BufRead>, FastaError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Streaming scanner over the records of one FASTA file.
///
/// Yields one `Result` per record so callers choose whether a bad record
/// aborts the scan or is skipped. Re-run the scan by opening a fresh one.
pub struct FastaScanner {
    inner: fasta::io::Reader<Box<dyn BufRead>>,
}

impl FastaScanner {
    pub fn open(path: &Path) -> Result<Self, FastaError> {
        let input = open_fasta_input(path)?;
        Ok(FastaScanner {
            inner: fasta::io::Reader::new(input),
        })
    }

    /// Collect all records, failing on the first malformed one.
    pub fn collect_seqs(self) -> Result<Vec<FastaSeq>, FastaError> {
        self.collect()
    }
}

impl Iterator for FastaScanner {
    type Item = Result<FastaSeq, FastaError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.inner.records().next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(FastaError::Io(e))),
        };

        let name = String::from_utf8_lossy(record.name()).to_string();
        let length = record.sequence().len() as u64;

        if length == 0 {
            return Some(Err(FastaError::EmptySequence(name)));
        }

        Some(Ok(FastaSeq { name, length }))
    }
}
