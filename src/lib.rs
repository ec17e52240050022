//! Staged configuration loader
//!
//! Loads YAML files organised by deployment stage, merges the `defaults`
//! stage with the requested one and serves values by dot path.
//!
//! ```no_run
//! use staged_config::config::Configuration;
//!
//! let mut conf = Configuration::new(Some("/app/configuration"), Some("prod"));
//! conf.load()?;
//! let port = conf.get("services.api.port", 8080)?;
//! # Ok::<(), staged_config::error::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
