//! Table and JSON output for CLI commands.
//!
//! Table mode flattens a serialisable value into dotted `key: value` lines,
//! so nested config sections read as `logging.level`, `host.upstream`.

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned key/value lines and tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Print rows as a table, or as a JSON array.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], empty: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("{empty}"),
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Json => print_json(rows),
    }
}

/// Print one value as flattened fields, or as a JSON document.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => match serde_json::to_value(item) {
            Ok(value) => print_fields("", &value),
            Err(e) => print_error(&format!("Cannot render output: {e}")),
        },
        OutputFormat::Json => print_json(item),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Cannot render output: {e}")),
    }
}

fn print_fields(prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                print_fields(&field_path(prefix, key), nested);
            }
        }
        Value::String(text) => print_kv(prefix, text),
        Value::Null => print_kv(prefix, "-"),
        other => print_kv(prefix, &other.to_string()),
    }
}

fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
