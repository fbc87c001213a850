// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command definitions for JoinLite

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug messages and above (verbose)
    Debug,
    /// All messages including trace (very verbose)
    Trace,
    /// Disable all logging
    Off,
}

impl LogLevel {
    /// Convert to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// JoinLite CLI - error-isolating nested query execution
#[derive(Parser)]
#[command(name = "joinlite")]
#[command(about = "JoinLite - run nested attribute queries over JSON data")]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace, off)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log level: explicit level, then --verbose, then warnings only
    pub fn level_filter(&self) -> log::LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.to_level_filter(),
            (None, true) => log::LevelFilter::Debug,
            (None, false) => log::LevelFilter::Warn,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show detailed version information
    Version,

    /// Execute a query document against a JSON data file
    Run {
        /// Query document (JSON array), e.g. '["name", {"friends": ["name"]}]'
        #[arg(short, long)]
        query: PathBuf,

        /// Root entity (JSON object); attributes shaped like {"$error": "..."} fail
        #[arg(short, long)]
        data: PathBuf,

        /// Execution options file (JSON); flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Abort on the first node failure instead of isolating it
        #[arg(long)]
        fail_fast: bool,

        /// Resolve sibling nodes in parallel
        #[arg(long)]
        parallel: bool,

        /// Relocate errors next to the data they belong to
        #[arg(short, long)]
        raise_errors: bool,

        /// Store structured error details instead of message strings
        #[arg(long)]
        structured_errors: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Relocate the root error index of a saved JSON result
    Raise {
        /// Result file produced by `run --format json`
        input: PathBuf,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
