// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for JoinLite
//!
//! Provides command-line execution of query documents over JSON data,
//! optional error raising, and relocation of errors in saved results.

pub mod commands;
pub mod error;
pub mod output;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{handle_raise, handle_run, handle_version, RunRequest};
