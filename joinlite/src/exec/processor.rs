// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error processors turn raw node failures into stored error details

use crate::exec::context::ExecutionContext;
use crate::exec::error::{NodeFailure, ProcessorError};
use crate::exec::result::ErrorDetail;
use serde_json::Value as JsonValue;

/// Transforms a node failure into the detail recorded in the error index
///
/// Only the returned detail is stored. A processor may have side effects such
/// as logging, but an `Err` return is treated as a fatal configuration bug
/// and aborts the whole execution.
pub trait ErrorProcessor: Send + Sync {
    fn process(
        &self,
        context: &ExecutionContext,
        failure: &NodeFailure,
    ) -> Result<ErrorDetail, ProcessorError>;
}

impl<F> ErrorProcessor for F
where
    F: Fn(&ExecutionContext, &NodeFailure) -> Result<ErrorDetail, ProcessorError> + Send + Sync,
{
    fn process(
        &self,
        context: &ExecutionContext,
        failure: &NodeFailure,
    ) -> Result<ErrorDetail, ProcessorError> {
        self(context, failure)
    }
}

/// Renders `"<kind>: <message>"`, followed by `" - <data>"` when the failure
/// carries structured data
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorProcessor;

impl ErrorProcessor for DefaultErrorProcessor {
    fn process(
        &self,
        _context: &ExecutionContext,
        failure: &NodeFailure,
    ) -> Result<ErrorDetail, ProcessorError> {
        Ok(JsonValue::String(describe_failure(failure)))
    }
}

/// Default single-line description of a failure
pub fn describe_failure(failure: &NodeFailure) -> String {
    let cause = &failure.cause;
    match &cause.data {
        Some(data) => format!("{}: {} - {}", cause.kind, cause.message, data),
        None => format!("{}: {}", cause.kind, cause.message),
    }
}

/// Stores the failure as structured JSON: kind, message, data and path
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredErrorProcessor;

impl ErrorProcessor for StructuredErrorProcessor {
    fn process(
        &self,
        _context: &ExecutionContext,
        failure: &NodeFailure,
    ) -> Result<ErrorDetail, ProcessorError> {
        let path = serde_json::to_value(&failure.path).map_err(|e| ProcessorError(e.to_string()))?;
        Ok(serde_json::json!({
            "kind": failure.cause.kind,
            "message": failure.cause.message,
            "data": failure.cause.data,
            "path": path,
        }))
    }
}
