// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Relocating errors next to their data
//!
//! [`raise_errors`] moves every entry of the root error index into the map
//! that holds the failed node, keyed by the node's final path segment:
//!
//! ```text
//! {go: {nest: {trigger-error: <sentinel>}, trigger-error: <sentinel>},
//!  errors: {[go nest trigger-error] "Error triggered",
//!           [go trigger-error]      "Error triggered"}}
//! =>
//! {go: {nest: {trigger-error: <sentinel>,
//!              errors: {trigger-error "Error triggered"}},
//!       trigger-error: <sentinel>,
//!       errors: {trigger-error "Error triggered"}}}
//! ```

use crate::exec::result::{ErrorSlot, ExecutionResult, LocalErrors, ResultValue};
use crate::query::Path;
use std::collections::BTreeMap;

/// Relocate root-level errors to the parents of the failed nodes
///
/// Results without a root error index are returned unchanged, so applying
/// this to its own output is a no-op. Entries whose parent map does not exist
/// in the tree are dropped with a warning; executions never produce them.
pub fn raise_errors(mut result: ExecutionResult) -> ExecutionResult {
    let index = match result.take_errors() {
        Some(ErrorSlot::Index(index)) => index,
        other => {
            if let Some(slot) = other {
                result.set_errors(slot);
            }
            return result;
        }
    };

    let mut groups: BTreeMap<Path, LocalErrors> = BTreeMap::new();
    for (path, detail) in index {
        match path.split_leaf() {
            Some((parent, leaf)) => {
                groups.entry(parent).or_default().insert(leaf.clone(), detail);
            }
            None => log::warn!("Dropping error recorded at the empty path"),
        }
    }
    log::debug!("Raising errors into {} parent map(s)", groups.len());

    let raised = attach_map(result, &Path::root(), &mut groups);
    for parent in groups.keys() {
        log::warn!("Dropping errors for unreachable parent {}", parent);
    }
    raised
}

/// [`raise_errors`] over a borrowed result, leaving the original untouched
pub fn raise_errors_ref(result: &ExecutionResult) -> ExecutionResult {
    raise_errors(result.clone())
}

fn attach_map(
    map: ExecutionResult,
    path: &Path,
    groups: &mut BTreeMap<Path, LocalErrors>,
) -> ExecutionResult {
    if groups.is_empty() {
        return map;
    }

    let (fields, errors) = map.into_fields();
    let fields = fields
        .into_iter()
        .map(|(name, value)| {
            let child = path.child(name.as_str());
            let value = attach_value(value, &child, groups);
            (name, value)
        })
        .collect();

    let errors = match groups.remove(path) {
        Some(local) => Some(merge_local(errors, local, path)),
        None => errors,
    };
    ExecutionResult::from_fields(fields, errors)
}

fn attach_value(
    value: ResultValue,
    path: &Path,
    groups: &mut BTreeMap<Path, LocalErrors>,
) -> ResultValue {
    match value {
        ResultValue::Map(map) => ResultValue::Map(attach_map(map, path, groups)),
        ResultValue::List(items) => ResultValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| attach_value(item, &path.child(index), groups))
                .collect(),
        ),
        other => other,
    }
}

fn merge_local(existing: Option<ErrorSlot>, local: LocalErrors, path: &Path) -> ErrorSlot {
    match existing {
        Some(ErrorSlot::Local(mut merged)) => {
            merged.extend(local);
            ErrorSlot::Local(merged)
        }
        Some(ErrorSlot::Index(_)) => {
            log::warn!("Replacing nested error index at {} with raised errors", path);
            ErrorSlot::Local(local)
        }
        None => ErrorSlot::Local(local),
    }
}
