//! CLI command definitions for staged-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod dump;

use clap::{Parser, Subcommand};
use dump::DumpArgs;

/// Inspect stage-layered YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dump loaded configuration
    ///
    /// If [PATH] and [STAGE] are not passed, the CONFIG_PATH and STAGE
    /// environment variables are used.
    Dump(DumpArgs),
}
