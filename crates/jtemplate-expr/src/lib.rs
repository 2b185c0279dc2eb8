/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Restricted expression language for jtemplate.
//!
//! Templates never run host code. Every dynamic computation in a template
//! (`$if` conditions, `$switch` selectors, `$eval` bodies and `${...}`
//! interpolations) goes through this crate, which supports a closed grammar:
//!
//! - Literals: numbers, single/double quoted strings, `true`, `false`, `null`,
//!   array literals `[a, b]`
//! - Name lookup in the context, member access `a.b`, index access `a[0]`
//! - Calls, but only of array accessors already present in the context
//!   (`$items(1)`)
//! - Arithmetic `+ - * / %`, comparisons `< <= > >= == !=`, logical
//!   `&& || !`, and the conditional operator `?:`
//!
//! There is no assignment, no loops and no access to anything outside the
//! context passed in.
//!
//! # Example
//!
//! ```
//! use jtemplate_expr::{Map, Value, evaluate};
//!
//! let mut ctx = Map::new();
//! ctx.insert("a".to_string(), Value::Int(2));
//!
//! assert_eq!(evaluate("a * 3 + 1", &ctx).unwrap(), Value::Int(7));
//! assert_eq!(evaluate("a > 1 ? 'big' : 'small'", &ctx).unwrap(), Value::from("big"));
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{ExprResult, ExpressionError};
pub use eval::{eval_expr, evaluate};
pub use parser::parse;
pub use value::{ArrayAccessor, Map, Value};
