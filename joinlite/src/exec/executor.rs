// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query tree executor
//!
//! Depth-first traversal of a [`Query`]: every node is resolved through the
//! isolation wrapper, joins recurse into their sub-query with the resolved
//! entity (or each entity of a list). With `parallel` set, siblings at every
//! level are evaluated on the rayon pool; field order always follows the
//! query.

use crate::exec::aggregator::ErrorAggregator;
use crate::exec::context::ExecutionContext;
use crate::exec::error::{ExecResult, ExecutionError, NodeError};
use crate::exec::isolation::{AbortLatch, Isolation};
use crate::exec::result::{ExecutionResult, ResultValue};
use crate::query::{Path, Query, QueryNode};
use crate::resolver::{ResolveEnv, Resolved};
use rayon::prelude::*;
use serde_json::Value as JsonValue;

/// Executes queries against the resolver of its context
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    context: ExecutionContext,
}

impl QueryExecutor {
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Execute `query` against an empty root entity
    pub fn execute(&self, query: &Query) -> ExecResult<ExecutionResult> {
        self.execute_with_entity(query, &JsonValue::Object(Default::default()))
    }

    /// Execute `query` with `entity` as the root input
    ///
    /// Node failures never surface here unless fail-fast is set, in which
    /// case the first one is returned as [`ExecutionError::Aborted`] and no
    /// result is produced.
    pub fn execute_with_entity(
        &self,
        query: &Query,
        entity: &JsonValue,
    ) -> ExecResult<ExecutionResult> {
        let options = self.context.options();
        log::debug!(
            "Executing query with {} node(s) (fail_fast={}, parallel={})",
            query.node_count(),
            options.fail_fast,
            options.parallel
        );

        let aggregator = ErrorAggregator::new();
        let latch = AbortLatch::new();
        let traversal = Traversal {
            context: &self.context,
            isolation: Isolation::new(&self.context, &aggregator, &latch),
        };

        let outcome = traversal.execute_level(query, &Path::root(), entity);
        let mut result = match outcome {
            Ok(result) => result,
            Err(err) => return Err(settle_abort(err, &latch)),
        };

        aggregator.attach_to(&mut result);
        log::debug!("Query finished with {} isolated error(s)", result.error_count());
        Ok(result)
    }
}

/// Execute `query` with a one-off executor over `context`
pub fn execute(query: &Query, context: &ExecutionContext) -> ExecResult<ExecutionResult> {
    QueryExecutor::new(context.clone()).execute(query)
}

/// Report the latched first failure whichever branch finished the traversal
fn settle_abort(err: ExecutionError, latch: &AbortLatch) -> ExecutionError {
    match err {
        ExecutionError::Aborted { .. } | ExecutionError::Cancelled(_) => match latch.take_first() {
            Some(first) => ExecutionError::Aborted { first },
            None => err,
        },
        other => other,
    }
}

/// What a node resolved to, once checked against the node's shape
enum Produced {
    Done(ResultValue),
    One(JsonValue),
    Many(Vec<JsonValue>),
}

struct Traversal<'a> {
    context: &'a ExecutionContext,
    isolation: Isolation<'a>,
}

impl<'a> Traversal<'a> {
    fn execute_level(
        &self,
        query: &Query,
        path: &Path,
        entity: &JsonValue,
    ) -> ExecResult<ExecutionResult> {
        let fields = if self.context.options().parallel {
            query
                .nodes()
                .par_iter()
                .map(|node| self.execute_field(node, path, entity))
                .collect::<ExecResult<Vec<_>>>()?
        } else {
            query
                .nodes()
                .iter()
                .map(|node| self.execute_field(node, path, entity))
                .collect::<ExecResult<Vec<_>>>()?
        };
        Ok(ExecutionResult::from_fields(fields, None))
    }

    fn execute_field(
        &self,
        node: &QueryNode,
        parent: &Path,
        entity: &JsonValue,
    ) -> ExecResult<(String, ResultValue)> {
        let path = parent.child(node.attribute.as_str());
        let value = self.execute_node(node, &path, entity)?;
        Ok((node.attribute.clone(), value))
    }

    fn execute_node(
        &self,
        node: &QueryNode,
        path: &Path,
        entity: &JsonValue,
    ) -> ExecResult<ResultValue> {
        log::trace!("Resolving {}", path);
        let env = ResolveEnv {
            path,
            entity,
            context: self.context,
        };

        let produced = self.isolation.guard(path, || {
            let resolved = self.context.resolver().resolve(&env, node)?;
            produce(node, resolved)
        })?;

        let Some(produced) = produced else {
            return Ok(ResultValue::Error);
        };

        match (produced, &node.join) {
            (Produced::Done(value), _) => Ok(value),
            (Produced::One(target), Some(subquery)) => {
                Ok(ResultValue::Map(self.execute_level(subquery, path, &target)?))
            }
            (Produced::Many(targets), Some(subquery)) => {
                self.execute_list(subquery, path, &targets).map(ResultValue::List)
            }
            // produce() only yields join targets for join nodes
            (Produced::One(target), None) => Ok(ResultValue::Value(target)),
            (Produced::Many(targets), None) => Ok(ResultValue::Value(JsonValue::Array(targets))),
        }
    }

    fn execute_list(
        &self,
        subquery: &Query,
        path: &Path,
        targets: &[JsonValue],
    ) -> ExecResult<Vec<ResultValue>> {
        let run = |(index, target): (usize, &JsonValue)| {
            self.execute_level(subquery, &path.child(index), target)
                .map(ResultValue::Map)
        };

        if self.context.options().parallel {
            targets.par_iter().enumerate().map(run).collect()
        } else {
            targets.iter().enumerate().map(run).collect()
        }
    }
}

fn produce(node: &QueryNode, resolved: Resolved) -> Result<Produced, NodeError> {
    if !node.is_join() {
        return Ok(match resolved {
            Resolved::Value(value) | Resolved::Entity(value) => Produced::Done(ResultValue::Value(value)),
            Resolved::Entities(items) => Produced::Done(ResultValue::Value(JsonValue::Array(items))),
            Resolved::NotFound => Produced::Done(ResultValue::NotFound),
        });
    }

    match resolved {
        Resolved::NotFound => Ok(Produced::Done(ResultValue::NotFound)),
        Resolved::Entity(target) => Ok(Produced::One(target)),
        Resolved::Entities(targets) => Ok(Produced::Many(targets)),
        Resolved::Value(value @ JsonValue::Object(_)) => Ok(Produced::One(value)),
        Resolved::Value(JsonValue::Array(items)) if items.iter().all(JsonValue::is_object) => {
            Ok(Produced::Many(items))
        }
        Resolved::Value(other) => Err(NodeError::invalid_join(&node.attribute, &other)),
    }
}
