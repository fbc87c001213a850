// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JoinLite - error-isolating execution of nested attribute queries
//!
//! A query is a tree of attribute requests; joins expand an attribute into a
//! nested sub-query. JoinLite drives the traversal, asks a caller-supplied
//! [`Resolver`] for each node, and keeps going when a node fails: the failed
//! node holds an error sentinel and the failure is recorded in an error index
//! keyed by the node's [`Path`].
//!
//! # Quick Start
//!
//! ```no_run
//! use joinlite::{raise_errors, DataResolver, ExecutionContext, Query, QueryExecutor};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let query = Query::parse(r#"["name", {"friends": ["name"]}]"#)?;
//! let context = ExecutionContext::new(Arc::new(DataResolver::new()));
//! let result = QueryExecutor::new(context)
//!     .execute_with_entity(&query, &json!({"name": "Alice", "friends": []}))?;
//!
//! // Move errors next to the data they belong to
//! let raised = raise_errors(result);
//! println!("{}", raised.to_json());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`query`] - query tree model, paths, JSON query documents
//! - [`resolver`] - resolver capability and the bundled resolvers
//! - [`exec`] - traversal, isolation, aggregation, error processors
//! - [`raise`] - relocation of errors next to their data

pub mod exec;
pub mod query;
pub mod raise;
pub mod resolver;

pub use exec::{
    execute, ConfigError, DefaultErrorProcessor, ErrorDetail, ErrorIndex, ErrorProcessor,
    ErrorSlot, ExecResult, ExecutionContext, ExecutionError, ExecutionOptions, ExecutionResult,
    LocalErrors, NodeError, NodeFailure, ProcessorError, QueryExecutor, ResultParseError,
    ResultValue, StructuredErrorProcessor, ERRORS_KEY, ERROR_SENTINEL, NOT_FOUND,
};
pub use query::{Key, Path, Query, QueryError, QueryNode};
pub use raise::{raise_errors, raise_errors_ref};
pub use resolver::{DataResolver, ResolveEnv, Resolved, Resolver, ResolverRegistry};
