//! Configuration root resolution and auto-discovery.
//!
//! The loader accepts whatever root it is given. Discovery is a separate step
//! that probes an ordered list of candidate directories and picks the first
//! that exists.

use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Root used when neither an explicit path nor `CONFIG_PATH` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/app/configuration";

/// Candidate roots probed by auto-discovery, in order.
pub const DEFAULT_LOCATIONS: &[&str] = &[
    "/app/configuration",
    "/configuration",
    "./configuration",
    concat!(env!("CARGO_MANIFEST_DIR"), "/configuration"),
];

/// Canonicalize `path` when it exists, otherwise keep it verbatim.
///
/// A root that does not exist yet is not an error here; the stage loader
/// reports it when no files are found under it.
pub fn resolve_root(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The default candidate list as owned paths.
pub fn default_locations() -> Vec<PathBuf> {
    DEFAULT_LOCATIONS.iter().map(PathBuf::from).collect()
}

/// Build the probe order: `explicit` (trimmed, when non-empty) first, then
/// the candidates.
pub fn candidate_locations(explicit: Option<&str>, candidates: &[PathBuf]) -> Vec<PathBuf> {
    let mut locations = Vec::with_capacity(candidates.len() + 1);
    if let Some(explicit) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        locations.push(PathBuf::from(explicit));
    }
    locations.extend(candidates.iter().cloned());
    locations
}

/// Return the canonical form of the first candidate that exists.
///
/// Fails with [`ConfigError::DirectoryNotFound`] listing every candidate when
/// none exists.
pub fn discover(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find_map(|path| std::fs::canonicalize(path).ok())
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            candidates: candidates.to_vec(),
        })
}
