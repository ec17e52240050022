//! Dump subcommand: load a configuration and print it as YAML.

use crate::config::{Configuration, DEFAULT_INDENT, DEFAULT_INLINE, DumpOptions};
use crate::logging::Logger;
use crate::paths::default_locations;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the dump subcommand
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Configuration directory path
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Configuration stage
    #[arg(value_name = "STAGE")]
    pub stage: Option<String>,

    /// The level where you switch to inline YAML
    #[arg(short = 'l', long, default_value_t = DEFAULT_INLINE)]
    pub inline: usize,

    /// The amount of spaces to use for indentation of nested nodes
    #[arg(short = 's', long, default_value_t = DEFAULT_INDENT)]
    pub indent: usize,

    /// Log every loading step
    #[arg(short, long)]
    pub debug: bool,

    /// Probe the known configuration locations when no PATH is given
    #[arg(long, conflicts_with = "path")]
    pub auto: bool,
}

impl DumpArgs {
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            inline: self.inline,
            indent: self.indent,
        }
    }

    fn logger(&self) -> Logger {
        if self.debug {
            Logger::tracing().with_name("Conf")
        } else {
            Logger::null()
        }
    }
}

/// Load the configuration described by `args` and render it.
pub fn run_dump(args: &DumpArgs) -> Result<String> {
    let conf = if args.auto {
        Configuration::auto(args.stage.clone(), &default_locations())?
    } else {
        Configuration::new(args.path.clone(), args.stage.clone())
    };

    let mut conf = conf.with_logger(args.logger());
    conf.load()?;

    Ok(conf.dump(args.dump_options())?)
}
