//! Loading a single stage directory.
//!
//! A stage is a directory `root/<stage>/` holding `*.yaml` files. Every file
//! must wrap its content in one top-level key equal to the directory name:
//!
//! ```yaml
//! # root/test/database.yaml
//! test:
//!   databases:
//!     redis: { host: redis.test }
//! ```
//!
//! Files are folded through the distinct merge in the order the filesystem
//! lists them, which is unspecified. Two files in one stage should not set the
//! same scalar.

use super::merge::distinct_merge;
use super::node::{self, ConfigNode};
use crate::error::{ConfigError, Result};
use crate::logging::{LogLevel, Logger};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Extension a file needs to take part in a stage.
pub const YAML_EXTENSION: &str = "yaml";

/// Glob-style description of the files a stage reads, used in diagnostics.
pub fn stage_pattern(root: &Path, stage: &str) -> String {
    format!("{}/{}/*.{}", root.display(), stage, YAML_EXTENSION)
}

/// List the `*.yaml` files of a stage directory in filesystem order.
///
/// Hidden files are skipped. A missing directory lists nothing.
pub fn stage_files(root: &Path, stage: &str) -> Result<Vec<PathBuf>> {
    let dir = root.join(stage);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&dir).map_err(|source| ConfigError::Read {
        path: dir.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Read {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_yaml = path.extension().is_some_and(|ext| ext == YAML_EXTENSION);
        if is_yaml && !hidden && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Parse one stage file.
///
/// Returns `None` for an empty document (blank file, `~`, `{}`, ...).
pub fn parse_file(path: &Path) -> Result<Option<ConfigNode>> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if is_blank_document(&content) {
        return Ok(None);
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let node = node::from_yaml(yaml);
    Ok((!node::is_empty(&node)).then_some(node))
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Check a parsed document against its directory and unwrap the stage key.
///
/// Returns `None` when the stage key holds nothing.
pub fn unwrap_stage_document(
    document: ConfigNode,
    path: &Path,
) -> Result<Option<ConfigNode>> {
    let expected = path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Value::Object(map) = document else {
        return Err(ConfigError::InvalidDocument {
            file: path.to_path_buf(),
            reason: format!("expected a mapping with the single top-level key `{expected}`"),
        });
    };

    let key_count = map.len();
    let Some((top, value)) = map.into_iter().next() else {
        return Ok(None);
    };

    if top != expected {
        return Err(ConfigError::StageMismatch {
            expected,
            actual: top,
            file: path.to_path_buf(),
        });
    }

    if key_count > 1 {
        return Err(ConfigError::InvalidDocument {
            file: path.to_path_buf(),
            reason: format!("expected the single top-level key `{expected}`, found {key_count} keys"),
        });
    }

    match value {
        Value::Null => Ok(None),
        value if node::is_collection(&value) => Ok(Some(value)),
        _ => Err(ConfigError::InvalidDocument {
            file: path.to_path_buf(),
            reason: format!("the value under `{expected}` must be a mapping or a sequence"),
        }),
    }
}

/// Load and merge every file of one stage.
///
/// Fails with [`ConfigError::NoFilesFound`] when the stage has no `*.yaml`
/// files. Empty files are skipped.
pub fn load_stage(root: &Path, stage: &str, logger: &Logger) -> Result<ConfigNode> {
    let files = stage_files(root, stage)?;
    if files.is_empty() {
        return Err(ConfigError::NoFilesFound {
            pattern: stage_pattern(root, stage),
            path: root.display().to_string(),
            stage: stage.to_string(),
        });
    }

    logger.log_with_data(
        LogLevel::Debug,
        "Following config files found:",
        json!(files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>()),
    );

    let mut config = Value::Array(Vec::new());
    for file in &files {
        let Some(document) = parse_file(file)? else {
            logger.info(&format!("File {} is empty. Skip it.", file.display()));
            continue;
        };

        let Some(content) = unwrap_stage_document(document, file)? else {
            logger.warning(&format!("File {} has no content under `{}`. Skip it.", file.display(), stage));
            continue;
        };

        logger.debug(&format!(
            "Config {}/{} [top={}] is fine.",
            stage,
            file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            stage
        ));

        config = distinct_merge(config, content)?;
    }

    Ok(config)
}
