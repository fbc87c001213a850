// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query tree model
//!
//! A query is an ordered list of attribute requests. Each request is either a
//! leaf (just the attribute name) or a join, which pairs the attribute with a
//! nested sub-query evaluated against whatever the attribute resolves to.
//!
//! Every node of an executed query is addressed by a [`Path`], the ordered
//! sequence of attribute names and list indices leading to it from the root.

pub mod parse;

pub use parse::QueryError;

use crate::exec::result::ERRORS_KEY;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Position inside a list produced by a to-many join
    Index(usize),
    /// Attribute name
    Attr(String),
}

impl Key {
    pub fn attr(name: impl Into<String>) -> Self {
        Key::Attr(name.into())
    }

    /// Attribute name, if this segment is one
    pub fn as_attr(&self) -> Option<&str> {
        match self {
            Key::Attr(name) => Some(name),
            Key::Index(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Attr(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Attr(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Attr(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Location of a node inside an executed query tree
///
/// Paths are unique per node within one execution, which is what makes them
/// usable as keys of the error index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Key>);

impl Path {
    /// The empty path, addressing the root of the result
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(keys: Vec<Key>) -> Self {
        Self(keys)
    }

    /// Path of a direct child of this node
    pub fn child(&self, key: impl Into<Key>) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.into());
        Self(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment of the path
    pub fn leaf(&self) -> Option<&Key> {
        self.0.last()
    }

    /// Split into (parent path, final segment); `None` for the root path
    pub fn split_leaf(&self) -> Option<(Path, &Key)> {
        let (leaf, parent) = self.0.split_last()?;
        Some((Path(parent.to_vec()), leaf))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", key)?;
        }
        write!(f, "]")
    }
}

impl<K: Into<Key>> FromIterator<K> for Path {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Shorthand for building a [`Path`] from mixed names and indices
#[macro_export]
macro_rules! path {
    ($($key:expr),* $(,)?) => {
        $crate::query::Path::new(vec![$($crate::query::Key::from($key)),*])
    };
}

/// A single attribute request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNode {
    /// Requested attribute name
    pub attribute: String,
    /// Nested query for joins, `None` for leaf requests
    pub join: Option<Query>,
}

impl QueryNode {
    /// Leaf request for a plain attribute
    pub fn leaf(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            join: None,
        }
    }

    /// Join request: the attribute expands into `subquery`
    pub fn join(attribute: impl Into<String>, subquery: Query) -> Self {
        Self {
            attribute: attribute.into(),
            join: Some(subquery),
        }
    }

    pub fn is_join(&self) -> bool {
        self.join.is_some()
    }
}

/// An ordered list of attribute requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    nodes: Vec<QueryNode>,
}

impl Query {
    /// Build a query, rejecting duplicate or reserved attribute names at any
    /// level
    pub fn new(nodes: Vec<QueryNode>) -> Result<Self, QueryError> {
        let query = Self { nodes };
        query.validate()?;
        Ok(query)
    }

    pub fn nodes(&self) -> &[QueryNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes in the tree, joins included
    pub fn node_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| 1 + node.join.as_ref().map_or(0, Query::node_count))
            .sum()
    }

    fn validate(&self) -> Result<(), QueryError> {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if node.attribute.is_empty() {
                return Err(QueryError::EmptyAttribute);
            }
            if node.attribute == ERRORS_KEY {
                return Err(QueryError::ReservedAttribute(node.attribute.clone()));
            }
            if !seen.insert(node.attribute.as_str()) {
                return Err(QueryError::DuplicateAttribute(node.attribute.clone()));
            }
            if let Some(subquery) = &node.join {
                if subquery.is_empty() {
                    return Err(QueryError::EmptyJoin(node.attribute.clone()));
                }
                subquery.validate()?;
            }
        }
        Ok(())
    }
}
