//! PAF mapping-file parsing.
//!
//! Only the columns the metric engine consumes are kept: contig name and
//! length, target reference name, target span, match counts, and the
//! trailing alignment-operation (CIGAR-like) string. Coordinates are
//! 0-based, end-exclusive, in triplicated reference space.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;
use noodles::bgzf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PafError {
    #[error("failed to read mapping file")]
    Io(#[from] std::io::Error),
    /// A non-blank line with fewer than 12 tab-separated fields.
    #[error("line {0} has fewer than 12 fields")]
    MalformedRecord(usize),
    #[error("line {0} has a non-numeric coordinate or count field")]
    InvalidInteger(usize),
}

/// One row of mapping data.
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    pub contig_name: String,
    pub contig_len: u64,
    pub ref_name: String,
    pub ref_start: u64,
    pub ref_end: u64,
    /// Number of matching bases in the mapping.
    pub matches: u64,
    /// Alignment block length, including gaps.
    pub block_len: u64,
    /// Trailing alignment-operation string, kept verbatim (tag prefix and
    /// all); the engine extracts `<count><op>` pairs from it.
    pub cigar: String,
}

impl AlignmentRecord {
    pub fn span(&self) -> u64 {
        self.ref_end - self.ref_start
    }
}

/// Open a mapping file and auto-detect bgzip compression, returning a boxed BufRead
pub fn open_paf_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, PafError> {
    let path = path.as_ref();
    let file = File::open(path)?;

    // Check by file extension (faster than reading magic bytes)
    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz" || ext == "bgz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn parse_record(line: &str, line_no: usize) -> Result<AlignmentRecord, PafError> {
    let fields: Vec<&str> = line.trim_end().split('\t').collect();

    if fields.len() < 12 {
        return Err(PafError::MalformedRecord(line_no));
    }

    let int = |s: &str| s.parse::<u64>().map_err(|_| PafError::InvalidInteger(line_no));

    Ok(AlignmentRecord {
        contig_name: fields[0].to_string(),
        contig_len: int(fields[1])?,
        ref_name: fields[5].to_string(),
        ref_start: int(fields[7])?,
        ref_end: int(fields[8])?,
        matches: int(fields[9])?,
        block_len: int(fields[10])?,
        cigar: fields[fields.len() - 1].to_string(),
    })
}

/// Read every record of a mapping file.
///
/// Bad lines are skipped with a warning rather than aborting the parse;
/// blank lines are ignored silently.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<AlignmentRecord>, PafError> {
    let path = path.as_ref();
    let reader = open_paf_input(path)?;

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(&line, idx + 1) {
            Ok(record) => records.push(record),
            Err(e) => warn!("{}: skipping record: {e}", path.display()),
        }
    }
    Ok(records)
}

/// Records whose target reference matches exactly (case-sensitive).
pub fn records_for_reference<'a>(
    records: &'a [AlignmentRecord],
    reference: &str,
) -> Vec<&'a AlignmentRecord> {
    records.iter().filter(|r| r.ref_name == reference).collect()
}
