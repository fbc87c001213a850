// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Resolver reading attributes from JSON entities

use super::{NodeError, ResolveEnv, Resolved, Resolver};
use crate::query::QueryNode;
use serde_json::Value as JsonValue;

/// Resolves each attribute by looking it up on the current entity
///
/// Joins expand objects into entities and arrays of objects into entity
/// lists. With a failure marker configured, an attribute whose value is an
/// object containing the marker key fails instead of resolving:
///
/// ```text
/// {"age": {"$error": "age is private", "data": {"policy": "gdpr"}}}
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataResolver {
    failure_marker: Option<String>,
}

impl DataResolver {
    /// Marker key used by the command line tool
    pub const FAILURE_MARKER: &'static str = "$error";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_marker(mut self, marker: impl Into<String>) -> Self {
        self.failure_marker = Some(marker.into());
        self
    }

    fn injected_failure(&self, value: &JsonValue) -> Option<NodeError> {
        let marker = self.failure_marker.as_deref()?;
        let object = value.as_object()?;
        let message = object.get(marker)?;
        let message = match message {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        let kind = object
            .get("kind")
            .and_then(JsonValue::as_str)
            .unwrap_or(NodeError::DEFAULT_KIND);
        let mut error = NodeError::with_kind(kind, message);
        if let Some(data) = object.get("data") {
            error = error.with_data(data.clone());
        }
        Some(error)
    }
}

impl Resolver for DataResolver {
    fn resolve(&self, env: &ResolveEnv<'_>, node: &QueryNode) -> Result<Resolved, NodeError> {
        let Some(value) = env.entity.get(&node.attribute) else {
            return Ok(Resolved::NotFound);
        };

        if let Some(error) = self.injected_failure(value) {
            return Err(error);
        }

        if !node.is_join() {
            return Ok(Resolved::Value(value.clone()));
        }

        match value {
            JsonValue::Object(_) => Ok(Resolved::Entity(value.clone())),
            JsonValue::Array(items) if items.iter().all(JsonValue::is_object) => {
                Ok(Resolved::Entities(items.clone()))
            }
            // Not joinable; the executor reports it as an invalid join
            other => Ok(Resolved::Value(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::context::ExecutionContext;
    use crate::query::{Path, Query};
    use serde_json::json;
    use std::sync::Arc;

    fn resolve(resolver: &DataResolver, entity: &JsonValue, node: &QueryNode) -> Result<Resolved, NodeError> {
        let context = ExecutionContext::new(Arc::new(DataResolver::new()));
        let path = Path::root().child(node.attribute.as_str());
        let env = ResolveEnv {
            path: &path,
            entity,
            context: &context,
        };
        resolver.resolve(&env, node)
    }

    #[test]
    fn test_missing_attribute_is_not_found() {
        let result = resolve(&DataResolver::new(), &json!({"a": 1}), &QueryNode::leaf("b"));
        assert_eq!(result, Ok(Resolved::NotFound));
    }

    #[test]
    fn test_join_expands_entities() {
        let sub = Query::new(vec![QueryNode::leaf("name")]).unwrap();
        let entity = json!({"friends": [{"name": "a"}, {"name": "b"}], "best": {"name": "c"}});

        let friends = resolve(&DataResolver::new(), &entity, &QueryNode::join("friends", sub.clone()));
        assert!(matches!(friends, Ok(Resolved::Entities(items)) if items.len() == 2));

        let best = resolve(&DataResolver::new(), &entity, &QueryNode::join("best", sub));
        assert_eq!(best, Ok(Resolved::Entity(json!({"name": "c"}))));
    }

    #[test]
    fn test_failure_marker() {
        let resolver = DataResolver::new().with_failure_marker(DataResolver::FAILURE_MARKER);
        let entity = json!({"age": {"$error": "private", "kind": "Denied", "data": {"policy": "gdpr"}}});

        let err = resolve(&resolver, &entity, &QueryNode::leaf("age")).unwrap_err();
        assert_eq!(err.kind, "Denied");
        assert_eq!(err.message, "private");
        assert_eq!(err.data, Some(json!({"policy": "gdpr"})));
    }

    #[test]
    fn test_marker_ignored_when_not_configured() {
        let entity = json!({"age": {"$error": "private"}});
        let result = resolve(&DataResolver::new(), &entity, &QueryNode::leaf("age"));
        assert_eq!(result, Ok(Resolved::Value(json!({"$error": "private"}))));
    }
}
