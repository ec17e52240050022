//! Error types for configuration loading and lookup.
//!
//! Every variant is fatal to the `load()` call that produced it: a failed load
//! never installs a partial tree.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, loading or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The glob for a stage directory matched no `*.yaml` files.
    #[error(
        "Files not found. Used glob pattern: {pattern}.\nCONFIG_PATH={path} and STAGE={stage} is correct?"
    )]
    NoFilesFound {
        pattern: String,
        path: String,
        stage: String,
    },

    /// A file's top-level key disagrees with the directory it lives in.
    #[error(
        "Developer error! STAGE [{expected}] is not equals top of file [{actual}]. Please, fix the file [{}].",
        .file.display()
    )]
    StageMismatch {
        expected: String,
        actual: String,
        file: PathBuf,
    },

    /// Auto-discovery exhausted every candidate location.
    #[error("Configuration directory not found in known paths: {}", join_paths(.candidates))]
    DirectoryNotFound { candidates: Vec<PathBuf> },

    /// A non-empty document whose root is not a single-key mapping.
    #[error("Invalid configuration document [{}]: {reason}", .file.display())]
    InvalidDocument { file: PathBuf, reason: String },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Accessor used before a successful `load()`.
    #[error("Configuration not loaded. Method `load` called?")]
    NotLoaded,

    /// Merge recursion exceeded the nesting guard.
    #[error("Configuration nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
