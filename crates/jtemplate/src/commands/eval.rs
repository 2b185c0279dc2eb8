/*
 * eval.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `jtemplate eval`: evaluate one expression the way `$eval` would and print
//! the result as JSON.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use jtemplate_core::{ExpressionEvaluator, StandardEvaluator, Value, prepare_context};

use super::{load_context, to_json_text};

pub fn execute(expression: &str, context: Option<&Path>, overrides: &[String]) -> Result<()> {
    let Value::Object(mut context) = Value::from(load_context(context, overrides)?) else {
        bail!("Context must be a JSON object");
    };
    prepare_context(&mut context);
    debug!(expression, "evaluating expression");

    let value = StandardEvaluator.evaluate(expression, &context)?;
    let json = value
        .to_json()
        .with_context(|| format!("Result of '{}' has no JSON form", expression))?;
    println!("{}", to_json_text(&json, true)?);
    Ok(())
}
