// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution result types
//!
//! An [`ExecutionResult`] mirrors the shape of the query that produced it:
//! one field per requested attribute, in query order. Joins produce nested
//! results (or lists of them), failed nodes hold [`ResultValue::Error`].
//!
//! Each map carries at most one reserved errors slot. At the root, before
//! errors are raised, it holds the [`ErrorIndex`] keyed by full path; after
//! [`crate::raise_errors`] every map holding failed children carries
//! [`LocalErrors`] keyed by the child's final path segment.

use crate::query::{Key, Path};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reserved key under which errors are rendered in JSON output
pub const ERRORS_KEY: &str = "joinlite/errors";

/// JSON rendering of [`ResultValue::Error`]
pub const ERROR_SENTINEL: &str = "joinlite/reader-error";

/// JSON rendering of [`ResultValue::NotFound`]
pub const NOT_FOUND: &str = "joinlite/not-found";

/// Processed representation of one node failure
pub type ErrorDetail = JsonValue;

/// All failures of one execution, keyed by full path
pub type ErrorIndex = BTreeMap<Path, ErrorDetail>;

/// Failures of the direct children of one map, keyed by child segment
pub type LocalErrors = BTreeMap<Key, ErrorDetail>;

/// The reserved errors slot of a result map
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSlot {
    /// Root-level index produced by execution
    Index(ErrorIndex),
    /// Per-map errors produced by raising
    Local(LocalErrors),
}

/// Value produced for one query node
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    /// Plain attribute value
    Value(JsonValue),
    /// Result of a to-one join
    Map(ExecutionResult),
    /// Results of a to-many join
    List(Vec<ResultValue>),
    /// The resolver reported the attribute as absent
    NotFound,
    /// The node failed; details live in the errors slot
    Error,
}

impl ResultValue {
    pub fn is_error(&self) -> bool {
        matches!(self, ResultValue::Error)
    }

    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            ResultValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ExecutionResult> {
        match self {
            ResultValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResultValue]> {
        match self {
            ResultValue::List(items) => Some(items),
            _ => None,
        }
    }

    fn child(&self, key: &Key) -> Option<&ResultValue> {
        match (self, key) {
            (ResultValue::Map(map), Key::Attr(name)) => map.get(name),
            (ResultValue::List(items), Key::Index(index)) => items.get(*index),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            ResultValue::Value(value) => value.clone(),
            ResultValue::Map(map) => map.to_json(),
            ResultValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            ResultValue::NotFound => JsonValue::String(NOT_FOUND.to_string()),
            ResultValue::Error => JsonValue::String(ERROR_SENTINEL.to_string()),
        }
    }

    fn from_json(value: JsonValue) -> Result<Self, ResultParseError> {
        match value {
            JsonValue::String(s) if s == ERROR_SENTINEL => Ok(ResultValue::Error),
            JsonValue::String(s) if s == NOT_FOUND => Ok(ResultValue::NotFound),
            JsonValue::Object(map) => Ok(ResultValue::Map(ExecutionResult::from_json_map(map)?)),
            JsonValue::Array(items) if !items.is_empty() && items.iter().all(JsonValue::is_object) => {
                let items = items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ResultValue::List(items))
            }
            other => Ok(ResultValue::Value(other)),
        }
    }

    fn collect_sentinels(&self, path: &Path, out: &mut Vec<Path>) {
        match self {
            ResultValue::Error => out.push(path.clone()),
            ResultValue::Map(map) => map.collect_sentinels(path, out),
            ResultValue::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    item.collect_sentinels(&path.child(index), out);
                }
            }
            ResultValue::Value(_) | ResultValue::NotFound => {}
        }
    }
}

/// Errors raised when reading a rendered result back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResultParseError {
    #[error("Expected a JSON object at the result root")]
    ExpectedObject,

    /// The reserved errors key holds something other than an index or local errors
    #[error("Invalid errors entry: {0}")]
    InvalidErrors(String),
}

/// Mapping from attribute name to produced value, in query order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    fields: Vec<(String, ResultValue)>,
    errors: Option<ErrorSlot>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: ResultValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: ResultValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResultValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ResultValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Value at `path` relative to this map
    pub fn get_path(&self, path: &Path) -> Option<&ResultValue> {
        let (first, rest) = path.keys().split_first()?;
        let mut current = self.get(first.as_attr()?)?;
        for key in rest {
            current = current.child(key)?;
        }
        Some(current)
    }

    /// Map at `path`; the empty path addresses this map
    pub fn map_at(&self, path: &Path) -> Option<&ExecutionResult> {
        if path.is_empty() {
            return Some(self);
        }
        self.get_path(path)?.as_map()
    }

    pub fn errors(&self) -> Option<&ErrorSlot> {
        self.errors.as_ref()
    }

    /// Root error index, present only when the execution had failures
    pub fn error_index(&self) -> Option<&ErrorIndex> {
        match &self.errors {
            Some(ErrorSlot::Index(index)) => Some(index),
            _ => None,
        }
    }

    /// Errors of this map's direct children, present after raising
    pub fn local_errors(&self) -> Option<&LocalErrors> {
        match &self.errors {
            Some(ErrorSlot::Local(local)) => Some(local),
            _ => None,
        }
    }

    pub fn set_errors(&mut self, slot: ErrorSlot) {
        self.errors = Some(slot);
    }

    pub fn take_errors(&mut self) -> Option<ErrorSlot> {
        self.errors.take()
    }

    /// Number of entries in the root error index
    pub fn error_count(&self) -> usize {
        self.error_index().map_or(0, ErrorIndex::len)
    }

    /// Paths of every error sentinel in the tree, depth-first
    pub fn sentinel_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        self.collect_sentinels(&Path::root(), &mut out);
        out
    }

    fn collect_sentinels(&self, path: &Path, out: &mut Vec<Path>) {
        for (name, value) in &self.fields {
            value.collect_sentinels(&path.child(name.as_str()), out);
        }
    }

    pub(crate) fn into_fields(self) -> (Vec<(String, ResultValue)>, Option<ErrorSlot>) {
        (self.fields, self.errors)
    }

    pub(crate) fn from_fields(fields: Vec<(String, ResultValue)>, errors: Option<ErrorSlot>) -> Self {
        Self { fields, errors }
    }

    /// Render as JSON, placing the errors slot under [`ERRORS_KEY`]
    ///
    /// The root index renders as a list of `{"path": [...], "detail": ...}`
    /// entries since paths cannot be JSON object keys; local errors render as
    /// an object keyed by child segment.
    pub fn to_json(&self) -> JsonValue {
        let mut object = JsonMap::new();
        for (name, value) in &self.fields {
            object.insert(name.clone(), value.to_json());
        }
        match &self.errors {
            Some(ErrorSlot::Index(index)) => {
                let entries = index
                    .iter()
                    .map(|(path, detail)| {
                        let mut entry = JsonMap::new();
                        entry.insert("path".to_string(), serde_json::to_value(path).unwrap_or_default());
                        entry.insert("detail".to_string(), detail.clone());
                        JsonValue::Object(entry)
                    })
                    .collect();
                object.insert(ERRORS_KEY.to_string(), JsonValue::Array(entries));
            }
            Some(ErrorSlot::Local(local)) => {
                let entries = local
                    .iter()
                    .map(|(key, detail)| (key.to_string(), detail.clone()))
                    .collect();
                object.insert(ERRORS_KEY.to_string(), JsonValue::Object(entries));
            }
            None => {}
        }
        JsonValue::Object(object)
    }

    /// Read a result rendered by [`ExecutionResult::to_json`]
    ///
    /// Leaf values that are JSON objects (or non-empty arrays of objects) read
    /// back as nested maps.
    pub fn from_json(value: JsonValue) -> Result<Self, ResultParseError> {
        match value {
            JsonValue::Object(map) => Self::from_json_map(map),
            _ => Err(ResultParseError::ExpectedObject),
        }
    }

    fn from_json_map(map: JsonMap<String, JsonValue>) -> Result<Self, ResultParseError> {
        let mut result = ExecutionResult::new();
        for (name, value) in map {
            if name == ERRORS_KEY {
                result.errors = Some(parse_error_slot(value)?);
            } else {
                result.fields.push((name, ResultValue::from_json(value)?));
            }
        }
        Ok(result)
    }
}

fn parse_error_slot(value: JsonValue) -> Result<ErrorSlot, ResultParseError> {
    match value {
        JsonValue::Array(entries) => {
            let mut index = ErrorIndex::new();
            for entry in entries {
                let JsonValue::Object(mut entry) = entry else {
                    return Err(ResultParseError::InvalidErrors(
                        "index entries must be objects".to_string(),
                    ));
                };
                let path = entry
                    .remove("path")
                    .ok_or_else(|| ResultParseError::InvalidErrors("entry without path".to_string()))?;
                let path: Path = serde_json::from_value(path)
                    .map_err(|e| ResultParseError::InvalidErrors(e.to_string()))?;
                let detail = entry.remove("detail").unwrap_or(JsonValue::Null);
                index.insert(path, detail);
            }
            Ok(ErrorSlot::Index(index))
        }
        JsonValue::Object(entries) => Ok(ErrorSlot::Local(
            entries
                .into_iter()
                .map(|(key, detail)| (Key::Attr(key), detail))
                .collect(),
        )),
        other => Err(ResultParseError::InvalidErrors(format!(
            "expected array or object, found {}",
            other
        ))),
    }
}
