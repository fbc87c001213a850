// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for terminal output

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use joinlite::{ErrorDetail, ErrorSlot, ExecutionResult, Path, ResultValue};
use serde_json::Value as JsonValue;

use super::commands::OutputFormat;

/// Formats execution results as tables or JSON
pub struct ResultFormatter;

impl ResultFormatter {
    pub fn format(result: &ExecutionResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(result),
            OutputFormat::Table => Self::format_table(result),
        }
    }

    fn format_json(result: &ExecutionResult) -> String {
        serde_json::to_string_pretty(&result.to_json()).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    fn format_table(result: &ExecutionResult) -> String {
        let mut values = Vec::new();
        collect_values(result, &Path::root(), &mut values);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Path", "Value", "Status"]);
        for (path, value, status) in &values {
            table.add_row(vec![path.to_string(), value.clone(), status.to_string()]);
        }

        let mut errors = Vec::new();
        collect_errors(result, &Path::root(), &mut errors);

        let mut output = format!("{}\n({} value(s))", table, values.len());
        if !errors.is_empty() {
            let mut error_table = Table::new();
            error_table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Failed path", "Detail"]);
            for (path, detail) in &errors {
                error_table.add_row(vec![path.to_string(), render_detail(detail)]);
            }
            output.push_str(&format!("\n{}\n({} error(s))", error_table, errors.len()));
        }
        output
    }
}

fn collect_values(map: &ExecutionResult, path: &Path, out: &mut Vec<(Path, String, &'static str)>) {
    for (name, value) in map.fields() {
        collect_value(value, &path.child(name), out);
    }
}

fn collect_value(value: &ResultValue, path: &Path, out: &mut Vec<(Path, String, &'static str)>) {
    match value {
        ResultValue::Value(json) => out.push((path.clone(), json.to_string(), "ok")),
        ResultValue::Map(map) => collect_values(map, path, out),
        ResultValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_value(item, &path.child(index), out);
            }
        }
        ResultValue::NotFound => out.push((path.clone(), String::new(), "not found")),
        ResultValue::Error => out.push((path.clone(), String::new(), "error")),
    }
}

/// Errors from the root index and from every raised local errors map
fn collect_errors<'a>(map: &'a ExecutionResult, path: &Path, out: &mut Vec<(Path, &'a ErrorDetail)>) {
    match map.errors() {
        Some(ErrorSlot::Index(index)) => out.extend(index.iter().map(|(p, d)| (p.clone(), d))),
        Some(ErrorSlot::Local(local)) => {
            out.extend(local.iter().map(|(key, d)| (path.child(key.clone()), d)))
        }
        None => {}
    }
    for (name, value) in map.fields() {
        collect_nested_errors(value, &path.child(name), out);
    }
}

fn collect_nested_errors<'a>(value: &'a ResultValue, path: &Path, out: &mut Vec<(Path, &'a ErrorDetail)>) {
    match value {
        ResultValue::Map(map) => collect_errors(map, path, out),
        ResultValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_nested_errors(item, &path.child(index), out);
            }
        }
        _ => {}
    }
}

fn render_detail(detail: &ErrorDetail) -> String {
    match detail {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
