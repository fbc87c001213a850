// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-node error isolation
//!
//! Every resolver invocation goes through [`Isolation::guard`]. With
//! isolation active a failing node is recorded in the aggregator and replaced
//! by the error sentinel, and traversal moves on to its siblings. Under
//! fail-fast the first failure trips the [`AbortLatch`] and the whole
//! execution unwinds with no result.

use crate::exec::aggregator::ErrorAggregator;
use crate::exec::context::ExecutionContext;
use crate::exec::error::{ExecResult, ExecutionError, NodeError, NodeFailure};
use crate::query::Path;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Records the first failure of a fail-fast execution
///
/// Parallel branches race to trip the latch; the first one wins and the rest
/// observe it before invoking further resolvers.
#[derive(Debug, Default)]
pub struct AbortLatch {
    tripped: AtomicBool,
    first: Mutex<Option<NodeFailure>>,
}

impl AbortLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `failure` unless an earlier one already tripped the latch
    pub fn trip(&self, failure: &NodeFailure) {
        let mut first = self.first.lock();
        if first.is_none() {
            *first = Some(failure.clone());
        }
        self.tripped.store(true, Ordering::Release);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// The failure that tripped the latch
    pub fn take_first(&self) -> Option<NodeFailure> {
        self.first.lock().take()
    }
}

/// Isolation wrapper shared by every node of one execution
#[derive(Debug, Clone, Copy)]
pub struct Isolation<'a> {
    context: &'a ExecutionContext,
    aggregator: &'a ErrorAggregator,
    latch: &'a AbortLatch,
}

impl<'a> Isolation<'a> {
    pub fn new(
        context: &'a ExecutionContext,
        aggregator: &'a ErrorAggregator,
        latch: &'a AbortLatch,
    ) -> Self {
        Self {
            context,
            aggregator,
            latch,
        }
    }

    /// Invoke the node at `path`
    ///
    /// Returns `Ok(Some(value))` on success and `Ok(None)` when the failure
    /// was recorded and the caller should place the error sentinel. Errors
    /// are fatal for the execution: an abort under fail-fast, a cancelled
    /// branch, or a failing error processor.
    pub fn guard<T, F>(&self, path: &Path, invoke: F) -> ExecResult<Option<T>>
    where
        F: FnOnce() -> Result<T, NodeError>,
    {
        if self.context.is_fail_fast() {
            return self.invoke_unprotected(path, invoke).map(Some);
        }

        let outcome = if self.context.options().catch_panics {
            panic::catch_unwind(AssertUnwindSafe(invoke))
                .unwrap_or_else(|payload| Err(NodeError::panic(panic_message(payload.as_ref()))))
        } else {
            invoke()
        };

        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(cause) => {
                self.isolate(NodeFailure::new(path.clone(), cause))?;
                Ok(None)
            }
        }
    }

    fn invoke_unprotected<T, F>(&self, path: &Path, invoke: F) -> ExecResult<T>
    where
        F: FnOnce() -> Result<T, NodeError>,
    {
        if self.latch.is_tripped() {
            return Err(ExecutionError::Cancelled(path.clone()));
        }

        invoke().map_err(|cause| {
            let failure = NodeFailure::new(path.clone(), cause);
            log::error!("Fail-fast execution aborted: {}", failure);
            self.latch.trip(&failure);
            ExecutionError::Aborted { first: failure }
        })
    }

    fn isolate(&self, failure: NodeFailure) -> ExecResult<()> {
        log::warn!("Isolated failure: {}", failure);

        let detail = self
            .context
            .processor()
            .process(self.context, &failure)
            .map_err(|source| ExecutionError::Processor {
                path: failure.path.clone(),
                source,
            })?;

        self.aggregator.record(failure.path, detail);
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "resolver panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::error::ProcessorError;
    use crate::exec::result::ErrorDetail;
    use crate::path;
    use crate::resolver::DataResolver;
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> ExecutionContext {
        ExecutionContext::new(Arc::new(DataResolver::new()))
    }

    #[test]
    fn test_success_passes_value_through() {
        let context = context();
        let aggregator = ErrorAggregator::new();
        let latch = AbortLatch::new();
        let isolation = Isolation::new(&context, &aggregator, &latch);

        let value = isolation.guard(&path!["a"], || Ok::<_, NodeError>(7)).unwrap();
        assert_eq!(value, Some(7));
        assert!(aggregator.is_empty());
    }

    #[test]
    fn test_failure_is_recorded() {
        let context = context();
        let aggregator = ErrorAggregator::new();
        let latch = AbortLatch::new();
        let isolation = Isolation::new(&context, &aggregator, &latch);

        let value = isolation
            .guard(&path!["a"], || Err::<i32, _>(NodeError::new("Error triggered")))
            .unwrap();
        assert_eq!(value, None);
        assert_eq!(aggregator.len(), 1);
        assert!(!latch.is_tripped());
    }

    #[test]
    fn test_panic_is_recorded_as_failure() {
        let context = context();
        let aggregator = ErrorAggregator::new();
        let latch = AbortLatch::new();
        let isolation = Isolation::new(&context, &aggregator, &latch);

        let value = isolation
            .guard(&path!["a"], || -> Result<i32, NodeError> { panic!("kaboom") })
            .unwrap();
        assert_eq!(value, None);

        let mut result = crate::exec::result::ExecutionResult::new();
        aggregator.attach_to(&mut result);
        assert_eq!(
            result.error_index().unwrap().get(&path!["a"]),
            Some(&json!("panic: kaboom"))
        );
    }

    #[test]
    fn test_fail_fast_trips_latch() {
        let context = context().fail_fast(true);
        let aggregator = ErrorAggregator::new();
        let latch = AbortLatch::new();
        let isolation = Isolation::new(&context, &aggregator, &latch);

        let err = isolation
            .guard(&path!["a"], || Err::<i32, _>(NodeError::new("first")))
            .unwrap_err();
        assert_eq!(err.aborted_by().unwrap().path, path!["a"]);
        assert!(latch.is_tripped());
        assert!(aggregator.is_empty());

        // Later nodes are cancelled without being invoked
        let err = isolation
            .guard(&path!["b"], || -> Result<i32, NodeError> { panic!("must not run") })
            .unwrap_err();
        assert_eq!(err, ExecutionError::Cancelled(path!["b"]));
        assert_eq!(latch.take_first().unwrap().cause.message, "first");
    }

    #[test]
    fn test_processor_failure_is_fatal() {
        let failing = |_: &ExecutionContext, _: &NodeFailure| -> Result<ErrorDetail, ProcessorError> {
            Err(ProcessorError::from("cannot render"))
        };
        let context = context().with_processor(Arc::new(failing));
        let aggregator = ErrorAggregator::new();
        let latch = AbortLatch::new();
        let isolation = Isolation::new(&context, &aggregator, &latch);

        let err = isolation
            .guard(&path!["a"], || Err::<i32, _>(NodeError::new("x")))
            .unwrap_err();
        assert!(err.is_processor_failure());
        assert!(aggregator.is_empty());
    }
}
