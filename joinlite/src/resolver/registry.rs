// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-attribute resolver dispatch

use super::{NodeError, ResolveEnv, Resolved, Resolver};
use crate::query::QueryNode;
use std::collections::HashMap;
use std::sync::Arc;

/// Dispatches each node to the resolver registered for its attribute
///
/// Attributes without a registered resolver go to the fallback, or resolve
/// as not found when there is none.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn Resolver>>,
    fallback: Option<Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resolver` for `attribute`, replacing any earlier one
    pub fn register<R>(mut self, attribute: impl Into<String>, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.resolvers.insert(attribute.into(), Arc::new(resolver));
        self
    }

    pub fn with_fallback<R>(mut self, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.fallback = Some(Arc::new(resolver));
        self
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.resolvers.contains_key(attribute)
    }
}

impl Resolver for ResolverRegistry {
    fn resolve(&self, env: &ResolveEnv<'_>, node: &QueryNode) -> Result<Resolved, NodeError> {
        match self.resolvers.get(&node.attribute).or(self.fallback.as_ref()) {
            Some(resolver) => resolver.resolve(env, node),
            None => Ok(Resolved::NotFound),
        }
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut attributes: Vec<&String> = self.resolvers.keys().collect();
        attributes.sort();
        f.debug_struct("ResolverRegistry")
            .field("attributes", &attributes)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
