/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command implementations for the jtemplate CLI
//!
//! Each command module handles the CLI interface and delegates to
//! jtemplate-core for the actual work.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

pub mod eval;
pub mod from_now;
pub mod render;

/// Read and parse a JSON file; `-` reads stdin.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Build the context object from an optional file plus `KEY=JSON` overrides.
pub fn load_context(path: Option<&Path>, overrides: &[String]) -> Result<Value> {
    let mut context = match path {
        Some(path) => read_json(path)?,
        None => Value::Object(Map::new()),
    };
    if !context.is_object() {
        bail!("Context must be a JSON object");
    }
    for assignment in overrides {
        apply_override(&mut context, assignment)?;
    }
    Ok(context)
}

/// Apply one `KEY=JSON` override to `context`.
///
/// Dotted keys create intermediate objects. A value that does not parse as
/// JSON is taken as a plain string, so `--set name=Ada` works unquoted.
fn apply_override(context: &mut Value, assignment: &str) -> Result<()> {
    let Some((key, raw)) = assignment.split_once('=') else {
        bail!("Invalid --set '{}': expected KEY=JSON", assignment);
    };
    if key.is_empty() || key.split('.').any(str::is_empty) {
        bail!("Invalid --set '{}': empty key segment", assignment);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut segments: Vec<&str> = key.split('.').collect();
    let last = segments.pop().unwrap_or(key);
    let mut target = context;
    for segment in segments {
        let Value::Object(map) = target else {
            bail!("Invalid --set '{}': '{}' is not an object", assignment, segment);
        };
        target = map
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let Value::Object(map) = target else {
        bail!("Invalid --set '{}': parent of '{}' is not an object", assignment, last);
    };
    map.insert(last.to_string(), value);
    Ok(())
}

/// Serialize `value`, pretty unless `compact`.
pub fn to_json_text(value: &Value, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}
