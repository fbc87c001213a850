// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error aggregation for one top-level execution

use crate::exec::result::{ErrorDetail, ErrorIndex, ErrorSlot, ExecutionResult};
use crate::query::Path;
use parking_lot::Mutex;

/// Collects `(path, detail)` pairs recorded by the isolation wrapper
///
/// Parallel branches record under distinct paths, so the lock only guards
/// the map structure itself.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    index: Mutex<ErrorIndex>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the detail of a failed node
    ///
    /// Paths are unique per execution; a second entry for the same path keeps
    /// the first detail.
    pub fn record(&self, path: Path, detail: ErrorDetail) {
        let mut index = self.index.lock();
        debug_assert!(!index.contains_key(&path), "duplicate error path {}", path);
        if index.contains_key(&path) {
            log::error!("Duplicate error recorded for path {}; keeping first", path);
            return;
        }
        index.insert(path, detail);
    }

    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.lock().is_empty()
    }

    /// Attach the collected index to the result root; nothing is attached
    /// when no node failed
    pub fn attach_to(self, result: &mut ExecutionResult) {
        let index = self.index.into_inner();
        if !index.is_empty() {
            log::debug!("Attaching {} error(s) to result root", index.len());
            result.set_errors(ErrorSlot::Index(index));
        }
    }
}
