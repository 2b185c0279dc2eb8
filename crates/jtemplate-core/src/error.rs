/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template rendering.

use jtemplate_expr::ExpressionError;
use thiserror::Error;

use crate::directive::DirectiveKind;

/// Errors that can occur while rendering a template.
///
/// Rendering stops at the first error; nothing is caught or retried.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A directive's control field is not a string.
    #[error("Invalid construct: {directive} must be a string which the evaluator can process")]
    InvalidConstruct { directive: DirectiveKind },

    /// The `$switch` label has no matching sibling field.
    #[error("Missing case: no branch for switch label '{label}'")]
    MissingCase { label: String },

    /// The branch selected by `$if` (`$then` or `$else`) is absent.
    #[error("Missing branch: {branch} is required when the condition selects it")]
    MissingBranch { branch: &'static str },

    /// The `$fromNow` value is not a relative-date expression.
    #[error("Invalid $fromNow expression: '{expression}'")]
    DateExpression { expression: String },

    /// Error raised by the expression evaluator, propagated unchanged.
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// Strict mode only: a node carries more than one reserved key.
    #[error("Ambiguous directive: node has several reserved keys ({})", join_keys(.keys))]
    AmbiguousDirective { keys: Vec<DirectiveKind> },

    /// The template is nested deeper than the configured limit.
    #[error("Template nesting exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    /// The context passed to a JSON entry point is not an object.
    #[error("Context must be a JSON object, found {found}")]
    InvalidContext { found: &'static str },

    /// The rendered value has no JSON form.
    #[error("Rendered value cannot be converted to JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_keys(keys: &[DirectiveKind]) -> String {
    keys.iter()
        .map(|k| k.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
