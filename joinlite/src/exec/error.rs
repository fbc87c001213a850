// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use crate::query::Path;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Result type alias for query execution
pub type ExecResult<T> = std::result::Result<T, ExecutionError>;

/// A raw failure reported by a resolver for one node
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct NodeError {
    /// Short failure classification, e.g. `ResolverError`
    pub kind: String,
    pub message: String,
    /// Structured diagnostic data attached by the resolver
    pub data: Option<JsonValue>,
}

impl NodeError {
    pub const DEFAULT_KIND: &'static str = "ResolverError";

    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(Self::DEFAULT_KIND, message)
    }

    pub fn with_kind(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// A join resolved to something that is neither an entity nor a list of entities
    pub fn invalid_join(attribute: &str, found: &JsonValue) -> Self {
        Self::with_kind(
            "InvalidJoin",
            format!("Attribute '{}' cannot be joined: resolved to {}", attribute, found),
        )
    }

    /// A resolver panicked while producing the node's value
    pub fn panic(message: impl Into<String>) -> Self {
        Self::with_kind("panic", message)
    }
}

impl From<String> for NodeError {
    fn from(message: String) -> Self {
        NodeError::new(message)
    }
}

impl From<&str> for NodeError {
    fn from(message: &str) -> Self {
        NodeError::new(message)
    }
}

/// Failure of one query node, located by its path
#[derive(Error, Debug, Clone, PartialEq)]
#[error("node {path} failed: {cause}")]
pub struct NodeFailure {
    pub path: Path,
    #[source]
    pub cause: NodeError,
}

impl NodeFailure {
    pub fn new(path: Path, cause: NodeError) -> Self {
        Self { path, cause }
    }
}

/// Failure of the error processor itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ProcessorError(pub String);

impl From<String> for ProcessorError {
    fn from(message: String) -> Self {
        ProcessorError(message)
    }
}

impl From<&str> for ProcessorError {
    fn from(message: &str) -> Self {
        ProcessorError(message.to_string())
    }
}

/// Errors surfaced by query execution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// A node failed; carried from the traversal to the isolation wrapper and
    /// never returned from a top-level execution
    #[error("{0}")]
    Node(NodeFailure),

    /// The error processor failed; always fatal for the whole execution
    #[error("Error processor failed at {path}: {source}")]
    Processor {
        path: Path,
        #[source]
        source: ProcessorError,
    },

    /// Fail-fast execution stopped at its first node failure
    #[error("Execution aborted: {first}")]
    Aborted { first: NodeFailure },

    /// A parallel branch stopped after another branch aborted the execution
    #[error("Branch at {0} cancelled after abort")]
    Cancelled(Path),
}

impl ExecutionError {
    /// The node failure that aborted the execution, if any
    pub fn aborted_by(&self) -> Option<&NodeFailure> {
        match self {
            ExecutionError::Aborted { first } => Some(first),
            _ => None,
        }
    }

    pub fn is_processor_failure(&self) -> bool {
        matches!(self, ExecutionError::Processor { .. })
    }
}

impl From<NodeFailure> for ExecutionError {
    fn from(failure: NodeFailure) -> Self {
        ExecutionError::Node(failure)
    }
}
