// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-execution configuration
//!
//! An [`ExecutionContext`] bundles the resolver capability, the error
//! processor and the [`ExecutionOptions`] for one top-level execution. It is
//! immutable once built; the resolver and processor are shared read-only by
//! every branch of the traversal.

use crate::exec::processor::{DefaultErrorProcessor, ErrorProcessor};
use crate::resolver::Resolver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path as FsPath;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading execution options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Switches controlling how a query is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionOptions {
    /// Disable error isolation: the first node failure aborts the execution
    pub fail_fast: bool,
    /// Evaluate sibling nodes in parallel on the rayon pool
    pub parallel: bool,
    /// Treat resolver panics as node failures while isolation is active
    pub catch_panics: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            parallel: false,
            catch_panics: true,
        }
    }
}

impl ExecutionOptions {
    /// Load options from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Resolver, error processor and options of one execution
#[derive(Clone)]
pub struct ExecutionContext {
    resolver: Arc<dyn Resolver>,
    processor: Arc<dyn ErrorProcessor>,
    options: ExecutionOptions,
}

impl ExecutionContext {
    /// Context with the default error processor and default options
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self {
            resolver,
            processor: Arc::new(DefaultErrorProcessor),
            options: ExecutionOptions::default(),
        }
    }

    pub fn with_processor(mut self, processor: Arc<dyn ErrorProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.options.fail_fast = enabled;
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.options.parallel = enabled;
        self
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    pub fn processor(&self) -> &dyn ErrorProcessor {
        self.processor.as_ref()
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn is_fail_fast(&self) -> bool {
        self.options.fail_fast
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_options_defaults() {
        let options = ExecutionOptions::default();
        assert!(!options.fail_fast);
        assert!(!options.parallel);
        assert!(options.catch_panics);
    }

    #[test]
    fn test_options_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fail_fast": true}}"#).unwrap();

        let options = ExecutionOptions::from_json_file(file.path()).unwrap();
        assert!(options.fail_fast);
        assert!(!options.parallel);
        assert!(options.catch_panics);
    }

    #[test]
    fn test_options_reject_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"timeout": 5}}"#).unwrap();

        let err = ExecutionOptions::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
