// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the JoinLite CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI handlers
pub type Result<T> = std::result::Result<T, CliError>;

/// Main error type for CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    /// Input file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid JSON
    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Query document errors
    #[error("Query error: {0}")]
    Query(#[from] joinlite::QueryError),

    /// Options file errors
    #[error("Config error: {0}")]
    Config(#[from] joinlite::ConfigError),

    /// Execution errors (fail-fast aborts, processor failures)
    #[error("Execution error: {0}")]
    Execution(#[from] joinlite::ExecutionError),

    /// Saved result could not be read back
    #[error("Result error: {0}")]
    Result(#[from] joinlite::ResultParseError),
}
