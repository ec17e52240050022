//! Layered configuration: the `defaults` stage plus an optional named stage.
//!
//! `{root}/defaults/*.yaml` is always loaded. When the requested stage is not
//! `defaults`, `{root}/{stage}/*.yaml` is loaded too and merged on top.

use super::access;
use super::dump::{DumpOptions, dump};
use super::merge::distinct_merge;
use super::node::{self, ConfigNode};
use super::stage::load_stage;
use crate::error::{ConfigError, Result};
use crate::logging::Logger;
use crate::paths::{DEFAULT_CONFIG_PATH, candidate_locations, discover, resolve_root};
use serde_json::{Map, Value};
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the configuration root.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Environment variable overriding the stage.
pub const STAGE_ENV: &str = "STAGE";

/// The base stage, always loaded first.
pub const DEFAULT_STAGE: &str = "defaults";

static MISSING: ConfigNode = Value::Null;

/// Where and what to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Configuration root holding one directory per stage.
    pub path: PathBuf,
    /// Stage layered over `defaults`.
    pub stage: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
            stage: DEFAULT_STAGE.to_string(),
        }
    }
}

impl LoadOptions {
    /// Read `CONFIG_PATH` and `STAGE` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build options from an arbitrary variable lookup. Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Self {
            path: var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or(defaults.path),
            stage: var(STAGE_ENV).unwrap_or(defaults.stage),
        }
    }

    /// Replace the path when one is given.
    pub fn with_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        if let Some(path) = path {
            self.path = path.into();
        }
        self
    }

    /// Replace the stage when one is given.
    pub fn with_stage(mut self, stage: Option<impl Into<String>>) -> Self {
        if let Some(stage) = stage {
            self.stage = stage.into();
        }
        self
    }
}

/// Load `defaults` and, unless `stage` is `defaults`, the named stage on top.
///
/// The result is always rooted at a mapping.
pub fn build(root: &Path, stage: &str, logger: &Logger) -> Result<ConfigNode> {
    let defaults = load_stage(root, DEFAULT_STAGE, logger)?;

    let tree = if stage == DEFAULT_STAGE {
        defaults
    } else {
        let overlay = load_stage(root, stage, logger)?;
        distinct_merge(defaults, overlay)?
    };

    Ok(match tree {
        Value::Array(items) if items.is_empty() => Value::Object(Map::new()),
        tree => tree,
    })
}

/// Read-only view of a loaded configuration.
pub trait ConfigurationView {
    /// Value at a dot path, or `default` where it does not resolve.
    fn get(&self, key: &str, default: ConfigNode) -> Result<ConfigNode>;

    /// The whole tree.
    fn all(&self) -> Result<&ConfigNode>;
}

/// Implemented by components that are handed a shared configuration.
pub trait ConfigurationAware {
    fn set_configuration(&mut self, configuration: Arc<dyn ConfigurationView + Send + Sync>);
}

/// A stage-layered configuration tree.
///
/// Built with a root path and a stage, filled by [`Configuration::load`], then
/// read through [`get`](Configuration::get), [`all`](Configuration::all) or
/// indexing. There is no way to modify the loaded tree.
#[derive(Debug, Clone)]
pub struct Configuration {
    path: PathBuf,
    stage: String,
    logger: Logger,
    tree: Option<ConfigNode>,
}

impl Configuration {
    /// Create a configuration for `path` and `stage`, falling back to
    /// `CONFIG_PATH`/`STAGE` and then to the built-in defaults.
    pub fn new(path: Option<impl Into<PathBuf>>, stage: Option<impl Into<String>>) -> Self {
        Self::from_options(LoadOptions::from_env().with_path(path).with_stage(stage))
    }

    /// Create a configuration from resolved options.
    pub fn from_options(options: LoadOptions) -> Self {
        Self {
            path: resolve_root(&options.path),
            stage: options.stage,
            logger: Logger::null(),
            tree: None,
        }
    }

    /// Create a configuration rooted at the first existing candidate.
    ///
    /// A non-empty `CONFIG_PATH` is probed before `candidates`.
    pub fn auto(stage: Option<impl Into<String>>, candidates: &[PathBuf]) -> Result<Self> {
        Self::auto_with_lookup(stage, candidates, |name| std::env::var(name).ok())
    }

    /// [`Configuration::auto`] with `CONFIG_PATH` and `STAGE` read from `lookup`.
    pub fn auto_with_lookup(
        stage: Option<impl Into<String>>,
        candidates: &[PathBuf],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let explicit = lookup(CONFIG_PATH_ENV);
        let root = discover(&candidate_locations(explicit.as_deref(), candidates))?;
        let options = LoadOptions::from_lookup(lookup)
            .with_path(Some(root))
            .with_stage(stage);
        Ok(Self::from_options(options))
    }

    /// Attach a diagnostic logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the diagnostic logger.
    pub fn set_logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// Set the root, canonicalized when it exists.
    pub fn set_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.path = resolve_root(path);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_stage(&mut self, stage: impl Into<String>) -> &mut Self {
        self.stage = stage.into();
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Read and merge every stage file, replacing any previously loaded tree.
    ///
    /// On error the previous tree (if any) is kept.
    pub fn load(&mut self) -> Result<&mut Self> {
        self.logger
            .info(&format!("{CONFIG_PATH_ENV} = {}", self.path.display()));
        self.logger.info(&format!("{STAGE_ENV} = {}", self.stage));

        let tree = build(&self.path, &self.stage, &self.logger)?;
        self.tree = Some(tree);

        self.logger.info("Configuration loaded.");
        Ok(self)
    }

    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    /// Value at a dot path (`a.b.c`, `services.*.port`), or `default` where it
    /// does not resolve.
    pub fn get(&self, key: &str, default: impl Into<ConfigNode>) -> Result<ConfigNode> {
        let tree = self.all()?;
        Ok(access::get(tree, key, &default.into()))
    }

    /// The whole merged tree.
    pub fn all(&self) -> Result<&ConfigNode> {
        self.tree.as_ref().ok_or(ConfigError::NotLoaded)
    }

    /// Whether `key` resolves to a non-empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key, Value::Null)
            .is_ok_and(|value| !node::is_empty(&value))
    }

    /// Render the tree as YAML, preceded by a newline.
    pub fn dump(&self, options: DumpOptions) -> Result<String> {
        Ok(format!("\n{}", dump(self.all()?, options)))
    }
}

impl ConfigurationView for Configuration {
    fn get(&self, key: &str, default: ConfigNode) -> Result<ConfigNode> {
        Configuration::get(self, key, default)
    }

    fn all(&self) -> Result<&ConfigNode> {
        Configuration::all(self)
    }
}

impl Index<&str> for Configuration {
    type Output = ConfigNode;

    /// Borrow the value at a literal dot path; `Null` when it is missing or
    /// nothing is loaded.
    fn index(&self, key: &str) -> &ConfigNode {
        self.tree
            .as_ref()
            .and_then(|tree| access::find(tree, key))
            .unwrap_or(&MISSING)
    }
}
