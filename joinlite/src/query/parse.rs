// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JSON query documents
//!
//! A query document is a JSON array. Strings are leaf attributes, single-entry
//! objects are joins whose value is the nested query document:
//!
//! ```text
//! ["name", {"friends": ["name", "age"]}]
//! ```

use super::{Query, QueryNode};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised while building or parsing a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The document is not valid JSON
    #[error("Invalid query document: {0}")]
    InvalidJson(String),

    /// A query level is not a JSON array
    #[error("Expected a query array, found {0}")]
    ExpectedArray(String),

    /// An element is neither an attribute name nor a join object
    #[error("Invalid query element: {0}")]
    InvalidElement(String),

    /// A join object must contain exactly one attribute
    #[error("Join must have exactly one attribute, found {0}")]
    JoinArity(usize),

    #[error("Attribute names must not be empty")]
    EmptyAttribute,

    /// The same attribute is requested twice at one level
    #[error("Duplicate attribute in query: {0}")]
    DuplicateAttribute(String),

    /// The attribute name is the key under which errors are rendered
    #[error("Attribute name '{0}' is reserved")]
    ReservedAttribute(String),

    #[error("Join on '{0}' has an empty sub-query")]
    EmptyJoin(String),
}

impl Query {
    /// Parse a query from its JSON document form
    pub fn from_json(document: &JsonValue) -> Result<Self, QueryError> {
        let nodes = parse_level(document)?;
        Query::new(nodes)
    }

    /// Parse a query from JSON text
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let document: JsonValue =
            serde_json::from_str(text).map_err(|e| QueryError::InvalidJson(e.to_string()))?;
        Self::from_json(&document)
    }

    /// Render the query back into its document form
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.nodes()
                .iter()
                .map(|node| match &node.join {
                    None => JsonValue::String(node.attribute.clone()),
                    Some(subquery) => {
                        let mut join = serde_json::Map::new();
                        join.insert(node.attribute.clone(), subquery.to_json());
                        JsonValue::Object(join)
                    }
                })
                .collect(),
        )
    }
}

fn parse_level(document: &JsonValue) -> Result<Vec<QueryNode>, QueryError> {
    let elements = document
        .as_array()
        .ok_or_else(|| QueryError::ExpectedArray(describe(document)))?;

    elements.iter().map(parse_element).collect()
}

fn parse_element(element: &JsonValue) -> Result<QueryNode, QueryError> {
    match element {
        JsonValue::String(attribute) => Ok(QueryNode::leaf(attribute.clone())),
        JsonValue::Object(join) => {
            if join.len() != 1 {
                return Err(QueryError::JoinArity(join.len()));
            }
            let (attribute, subquery) = join.iter().next().ok_or(QueryError::JoinArity(0))?;
            let nodes = parse_level(subquery)?;
            // Validation of the nested level happens once, in Query::new at the top
            Ok(QueryNode::join(attribute.clone(), Query { nodes }))
        }
        other => Err(QueryError::InvalidElement(describe(other))),
    }
}

fn describe(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(_) => "boolean".to_string(),
        JsonValue::Number(n) => format!("number {}", n),
        JsonValue::String(s) => format!("string {:?}", s),
        JsonValue::Array(_) => "array".to_string(),
        JsonValue::Object(_) => "object".to_string(),
    }
}
