// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution engine
//!
//! This module walks a query tree, resolves every node through the caller's
//! resolver and isolates per-node failures so one failing attribute never
//! aborts the rest of the query.

pub mod aggregator;
pub mod context;
pub mod error;
pub mod executor;
pub mod isolation;
pub mod processor;
pub mod result;

// Re-export the main types for convenience
pub use aggregator::ErrorAggregator;
pub use context::{ConfigError, ExecutionContext, ExecutionOptions};
pub use error::{ExecResult, ExecutionError, NodeError, NodeFailure, ProcessorError};
pub use executor::{execute, QueryExecutor};
pub use processor::{DefaultErrorProcessor, ErrorProcessor, StructuredErrorProcessor};
pub use result::{
    ErrorDetail, ErrorIndex, ErrorSlot, ExecutionResult, LocalErrors, ResultParseError,
    ResultValue, ERRORS_KEY, ERROR_SENTINEL, NOT_FOUND,
};
