/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The seam between the renderer and the expression language.
//!
//! The renderer never interprets expression text itself. Conditions,
//! selectors, `$eval` bodies and interpolation markers are all handed to an
//! [`ExpressionEvaluator`], which must be pure and report failures as
//! [`ExpressionError`] values rather than panicking.

use jtemplate_expr::{ExpressionError, Map, Value};

/// Trait for evaluating expression source against a context.
pub trait ExpressionEvaluator {
    /// Evaluate `source` with `context` as the root scope.
    fn evaluate(&self, source: &str, context: &Map) -> Result<Value, ExpressionError>;
}

/// Evaluator backed by the `jtemplate-expr` language.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl ExpressionEvaluator for StandardEvaluator {
    fn evaluate(&self, source: &str, context: &Map) -> Result<Value, ExpressionError> {
        jtemplate_expr::evaluate(source, context)
    }
}

impl<E: ExpressionEvaluator + ?Sized> ExpressionEvaluator for &E {
    fn evaluate(&self, source: &str, context: &Map) -> Result<Value, ExpressionError> {
        (**self).evaluate(source, context)
    }
}
