/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for expression parsing and evaluation.

use thiserror::Error;

/// Errors that can occur while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// The expression source is not valid syntax.
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    /// A name or property that does not exist in the context.
    #[error("Undefined reference: {name}")]
    UndefinedReference { name: String },

    /// An operator was applied to values of the wrong kind.
    #[error("Type error: {message}")]
    Type { message: String },

    /// Integer or float division (or modulo) by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Call syntax applied to something that is not a function.
    #[error("Not callable: {name}")]
    NotCallable { name: String },
}

impl ExpressionError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        ExpressionError::Syntax {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        ExpressionError::Type {
            message: message.into(),
        }
    }
}

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExpressionError>;
