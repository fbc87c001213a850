// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node resolvers
//!
//! A [`Resolver`] produces the value of one query node given the entity the
//! node is requested on. Resolvers are supplied by the caller through the
//! [`ExecutionContext`]; the executor drives the traversal and recurses into
//! joins with whatever entities the resolver returns.
//!
//! Two resolvers ship with the crate:
//! - [`DataResolver`] - reads attributes straight out of JSON entities
//! - [`ResolverRegistry`] - dispatches per attribute to registered resolvers

pub mod data;
pub mod registry;

pub use crate::exec::error::NodeError;
pub use data::DataResolver;
pub use registry::ResolverRegistry;

use crate::exec::context::ExecutionContext;
use crate::query::{Path, QueryNode};
use serde_json::Value as JsonValue;

/// Everything a resolver can see while producing one node
#[derive(Debug, Clone, Copy)]
pub struct ResolveEnv<'a> {
    /// Path of the node being resolved
    pub path: &'a Path,
    /// Entity the attribute is requested on
    pub entity: &'a JsonValue,
    pub context: &'a ExecutionContext,
}

/// Outcome of resolving one node
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Plain value for a leaf request
    Value(JsonValue),
    /// Single entity a join's sub-query is evaluated against
    Entity(JsonValue),
    /// Entities a to-many join's sub-query is evaluated against, in order
    Entities(Vec<JsonValue>),
    /// The attribute does not exist on this entity
    NotFound,
}

/// Capability producing the value of a query node
pub trait Resolver: Send + Sync {
    fn resolve(&self, env: &ResolveEnv<'_>, node: &QueryNode) -> Result<Resolved, NodeError>;
}

impl<F> Resolver for F
where
    F: Fn(&ResolveEnv<'_>, &QueryNode) -> Result<Resolved, NodeError> + Send + Sync,
{
    fn resolve(&self, env: &ResolveEnv<'_>, node: &QueryNode) -> Result<Resolved, NodeError> {
        self(env, node)
    }
}
