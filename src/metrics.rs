//! Per-reference metric engine.
//!
//! Takes one assembler's alignment records against one reference and derives
//! contiguity, breadth of coverage, identity, C90/C95, N50, and per-contig
//! Phred-like quality scores.
//!
//! Reference coordinates arrive in triplicated space: the reference sequence
//! is repeated three times upstream so alignments spanning a circular
//! genome's origin are not undercounted. Every coordinate is folded back
//! into `[0, true_len)` before any coverage accounting, and a base is never
//! counted twice across the three virtual copies.

use indexmap::IndexMap;

use crate::paf::{records_for_reference, AlignmentRecord};

/// Window size for the lowest-identity scan over the longest alignment.
pub const DEFAULT_WINDOW_SIZE: usize = 1000;

/// Phred ceiling for a perfect-identity contig; log10(0) is undefined, so
/// identity 1.0 maps to 60 (a 1e-6 error rate).
pub const PHRED_CAP: f64 = 60.0;

/// Metrics for one (assembler, reference) pair.
#[derive(Debug, Clone)]
pub struct ReferenceMetrics {
    pub reference: String,
    /// True (single-copy) reference length in bases.
    pub reference_length: u64,
    /// Longest single alignment span over the true length.
    pub contiguity: f64,
    /// Mean of per-contig identities; one contribution per contig.
    pub identity: f64,
    /// Minimum window identity over the longest alignment's operations.
    pub lowest_identity: f64,
    /// Fraction of reference bases covered by the union of all alignments.
    pub breadth_of_coverage: f64,
    pub c90: usize,
    pub c95: usize,
    pub aligned_contigs: usize,
    /// N50 of the mapped contig lengths.
    pub n50: u64,
    /// Sum of mapped contig lengths (not alignment-block lengths).
    pub aligned_bases: u64,
    /// Per-contig identity and quality, in first-seen order.
    pub contigs: Vec<ContigQuality>,
}

/// Identity and Phred-like quality for one mapped contig.
#[derive(Debug, Clone)]
pub struct ContigQuality {
    pub contig: String,
    pub length: u64,
    pub identity: f64,
    pub phred: f64,
}

/// Aggregation of all alignment blocks of one contig against one reference.
struct ContigAlignment {
    length: u64,
    base_matches: u64,
}

/// Fold a triplicated-space coordinate back into `[0, true_len)`.
pub fn fold(position: u64, true_len: u64) -> u64 {
    if true_len == 0 {
        return 0;
    }
    position % true_len
}

/// Fraction of the reference covered by the union of the given intervals,
/// after folding. Intervals are `[start, end)` in triplicated space.
pub fn covered_fraction(intervals: &[(u64, u64)], true_len: u64) -> f64 {
    if true_len == 0 {
        return 0.0;
    }
    let mut covered = vec![false; true_len as usize];
    for &(start, end) in intervals {
        for position in start..end {
            covered[fold(position, true_len) as usize] = true;
        }
    }
    let count = covered.iter().filter(|&&c| c).count();
    count as f64 / true_len as f64
}

/// Expand run-length `<count><op>` pairs (ops `I D X =`) into a flat
/// per-base operation string. Anything else, including a leading tag
/// prefix, is passed over.
pub fn expand_cigar(cigar: &str) -> String {
    let mut expanded = String::new();
    let mut count = 0usize;
    for ch in cigar.chars() {
        if ch.is_ascii_digit() {
            count = count * 10 + (ch as u8 - b'0') as usize;
        } else {
            if count > 0 && matches!(ch, 'I' | 'D' | 'X' | '=') {
                expanded.extend(std::iter::repeat(ch).take(count));
            }
            count = 0;
        }
    }
    expanded
}

/// Minimum fraction of exact-match operations over a sliding window of the
/// expanded operation string. Returns 0.0 when the expanded string is not
/// longer than the window, never an unbounded value.
pub fn lowest_window_identity(cigar: &str, window: usize) -> f64 {
    let expanded = expand_cigar(cigar);
    let ops = expanded.as_bytes();
    if window == 0 || ops.len() <= window {
        return 0.0;
    }

    // Window start positions run over 0..len-window; the count slides
    // instead of being recomputed per window.
    let mut matches = ops[..window].iter().filter(|&&op| op == b'=').count();
    let mut lowest = matches;
    for i in 1..ops.len() - window {
        matches -= (ops[i - 1] == b'=') as usize;
        matches += (ops[i + window - 1] == b'=') as usize;
        lowest = lowest.min(matches);
    }
    lowest as f64 / window as f64
}

fn contigs_to_cover(lengths: &[u64], target: f64) -> usize {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut length_so_far = 0u64;
    for (i, length) in sorted.iter().enumerate() {
        length_so_far += length;
        if length_so_far as f64 >= target {
            return i + 1;
        }
    }
    // Threshold never reached; report the full contig count.
    sorted.len()
}

/// Number of contigs, longest first, whose cumulative length reaches 90% of
/// the reference length.
pub fn c90(lengths: &[u64], ref_len: u64) -> usize {
    contigs_to_cover(lengths, ref_len as f64 * 0.9)
}

/// Number of contigs, longest first, whose cumulative length reaches 95% of
/// the reference length.
pub fn c95(lengths: &[u64], ref_len: u64) -> usize {
    contigs_to_cover(lengths, ref_len as f64 * 0.95)
}

/// Contig length at which the cumulative sum, longest first, reaches half of
/// the total summed length. 0 for an empty input.
pub fn n50(lengths: &[u64]) -> u64 {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let total: u64 = sorted.iter().sum();
    let target = total as f64 * 0.5;
    let mut length_so_far = 0u64;
    for length in sorted {
        length_so_far += length;
        if length_so_far as f64 >= target && total > 0 {
            return length;
        }
    }
    0
}

/// Phred-like quality for a contig identity: `-10*log10(1-identity)`,
/// capped at [`PHRED_CAP`] when the identity is exact.
pub fn phred_quality_score(identity: f64) -> f64 {
    if identity < 1.0 {
        -10.0 * (1.0 - identity).log10()
    } else {
        PHRED_CAP
    }
}

/// Compute all per-reference statistics from one assembler's records.
///
/// Records targeting other references are ignored. An empty record set
/// degrades to zero metrics rather than a numeric error.
pub fn reference_metrics(
    records: &[AlignmentRecord],
    reference: &str,
    true_len: u64,
    window: usize,
) -> ReferenceMetrics {
    let hits = records_for_reference(records, reference);

    let mut contigs: IndexMap<&str, ContigAlignment> = IndexMap::new();
    let mut intervals = Vec::with_capacity(hits.len());
    let mut longest_span = 0u64;
    let mut longest_cigar: Option<&str> = None;

    for record in &hits {
        contigs
            .entry(record.contig_name.as_str())
            // Overlapping blocks double count their matches here; inherited
            // approximation, kept as the contract.
            .and_modify(|c| c.base_matches += record.matches)
            .or_insert(ContigAlignment {
                length: record.contig_len,
                base_matches: record.matches,
            });

        if record.span() > longest_span {
            longest_span = record.span();
            longest_cigar = Some(record.cigar.as_str());
        }
        intervals.push((record.ref_start, record.ref_end));
    }

    let lengths: Vec<u64> = contigs.values().map(|c| c.length).collect();
    let qualities: Vec<ContigQuality> = contigs
        .iter()
        .map(|(name, c)| {
            let identity = if c.length > 0 {
                c.base_matches as f64 / c.length as f64
            } else {
                0.0
            };
            ContigQuality {
                contig: (*name).to_string(),
                length: c.length,
                identity,
                phred: phred_quality_score(identity),
            }
        })
        .collect();

    let identity = if qualities.is_empty() {
        0.0
    } else {
        qualities.iter().map(|q| q.identity).sum::<f64>() / qualities.len() as f64
    };
    let contiguity = if true_len > 0 {
        longest_span as f64 / true_len as f64
    } else {
        0.0
    };
    let lowest_identity = longest_cigar
        .map(|cigar| lowest_window_identity(cigar, window))
        .unwrap_or(0.0);

    ReferenceMetrics {
        reference: reference.to_string(),
        reference_length: true_len,
        contiguity,
        identity,
        lowest_identity,
        breadth_of_coverage: covered_fraction(&intervals, true_len),
        c90: c90(&lengths, true_len),
        c95: c95(&lengths, true_len),
        aligned_contigs: contigs.len(),
        n50: n50(&lengths),
        aligned_bases: lengths.iter().sum(),
        contigs: qualities,
    }
}
