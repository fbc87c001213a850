// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for JoinLite

use colored::Colorize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::commands::OutputFormat;
use super::error::{CliError, Result};
use super::output::ResultFormatter;
use joinlite::{
    raise_errors, DataResolver, ExecutionContext, ExecutionOptions, ExecutionResult, Query,
    QueryExecutor, StructuredErrorProcessor,
};

/// Options of the run command, as given on the command line
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub query: PathBuf,
    pub data: PathBuf,
    pub config: Option<PathBuf>,
    pub fail_fast: bool,
    pub parallel: bool,
    pub raise_errors: bool,
    pub structured_errors: bool,
    pub format: OutputFormat,
}

/// Handle the run command
pub fn handle_run(request: RunRequest) -> Result<()> {
    let result = execute_request(&request)?;

    let errors = result.error_count();
    let result = if request.raise_errors {
        raise_errors(result)
    } else {
        result
    };

    println!("{}", ResultFormatter::format(&result, request.format));
    if errors > 0 && request.format == OutputFormat::Table {
        eprintln!(
            "{}",
            format!("{} node(s) failed; see errors above", errors).yellow()
        );
    }
    Ok(())
}

/// Execute the query described by `request`
pub fn execute_request(request: &RunRequest) -> Result<ExecutionResult> {
    let query = Query::from_json(&read_json(&request.query)?)?;
    let entity = read_json(&request.data)?;

    let mut options = match &request.config {
        Some(path) => ExecutionOptions::from_json_file(path)?,
        None => ExecutionOptions::default(),
    };
    // Flags only ever switch behaviour on
    options.fail_fast |= request.fail_fast;
    options.parallel |= request.parallel;
    log::debug!("Execution options: {:?}", options);

    let resolver = DataResolver::new().with_failure_marker(DataResolver::FAILURE_MARKER);
    let mut context = ExecutionContext::new(Arc::new(resolver)).with_options(options);
    if request.structured_errors {
        context = context.with_processor(Arc::new(StructuredErrorProcessor));
    }

    Ok(QueryExecutor::new(context).execute_with_entity(&query, &entity)?)
}

/// Handle the raise command
pub fn handle_raise(input: PathBuf) -> Result<()> {
    let result = ExecutionResult::from_json(read_json(&input)?)?;
    if result.error_index().is_none() {
        log::info!("No root error index in {:?}; output is unchanged", input);
    }

    let raised = raise_errors(result);
    println!("{}", ResultFormatter::format(&raised, OutputFormat::Json));
    Ok(())
}

/// Handle the version command
pub fn handle_version() {
    println!("{}", format!("joinlite {}", env!("CARGO_PKG_VERSION")).bold().green());
    println!("  errors key:      {}", joinlite::ERRORS_KEY);
    println!("  error sentinel:  {}", joinlite::ERROR_SENTINEL);
    println!("  not-found value: {}", joinlite::NOT_FOUND);
}

fn read_json(path: &Path) -> Result<JsonValue> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}
