// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JoinLite command-line entry point

mod cli;

use clap::Parser;
use cli::{Cli, Commands, RunRequest};
use colored::Colorize;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.level_filter())
        .format_timestamp(None)
        .init();

    let outcome = match cli.command {
        Commands::Version => {
            cli::handle_version();
            Ok(())
        }
        Commands::Run {
            query,
            data,
            config,
            fail_fast,
            parallel,
            raise_errors,
            structured_errors,
            format,
        } => cli::handle_run(RunRequest {
            query,
            data,
            config,
            fail_fast,
            parallel,
            raise_errors,
            structured_errors,
            format,
        }),
        Commands::Raise { input } => cli::handle_raise(input),
    };

    if let Err(e) = outcome {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}
