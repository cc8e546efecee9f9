//! Input discovery by filename convention.
//!
//! The assembler name is the suffix after the last underscore of the file
//! stem (`run1_spades.fasta` -> `spades`), and the mapping file for an
//! assembler is the `*.paf` whose stem carries the same suffix.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("failed to list input directory")]
    Io(#[from] std::io::Error),
    /// The assembler has no matching mapping file; fatal for that assembler
    /// only.
    #[error("no mapping file for assembler '{0}'")]
    MissingMapping(String),
}

/// Assembler name encoded in a file name: the part of the stem (before the
/// first dot) after the last underscore.
pub fn assembler_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.split('.').next()?;
    Some(stem.rsplit('_').next().unwrap_or(stem).to_string())
}

/// All `*.fasta` assemblies in a directory as (assembler, path) pairs,
/// sorted by assembler name.
pub fn discover_assemblies(dir: &Path) -> Result<Vec<(String, PathBuf)>, DiscoveryError> {
    let mut assemblies = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_fasta = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "fasta")
            .unwrap_or(false);
        if !is_fasta {
            continue;
        }
        if let Some(assembler) = assembler_name(&path) {
            assemblies.push((assembler, path));
        }
    }
    assemblies.sort();
    Ok(assemblies)
}

/// All mapping files (`*.paf`, optionally gzipped) in a directory.
pub fn discover_mappings(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut mappings = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.ends_with(".paf") || name.ends_with(".paf.gz") || name.ends_with(".paf.bgz") {
            mappings.push(path);
        }
    }
    mappings.sort();
    Ok(mappings)
}

/// The mapping file for one assembler: first file whose name contains
/// `_<assembler>.` before the extension.
pub fn find_mapping<'a>(
    mappings: &'a [PathBuf],
    assembler: &str,
) -> Result<&'a PathBuf, DiscoveryError> {
    let marker = format!("_{assembler}.");
    mappings
        .iter()
        .find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.contains(&marker))
                .unwrap_or(false)
        })
        .ok_or_else(|| DiscoveryError::MissingMapping(assembler.to_string()))
}
