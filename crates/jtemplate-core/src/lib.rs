/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Declarative JSON templating.
//!
//! A template is an ordinary JSON document. Rendering it against a context
//! (a JSON object) produces a new document in which:
//!
//! - `"${expr}"` markers inside strings are replaced by the stringified
//!   value of `expr`,
//! - `{"$if": "cond", "$then": A, "$else": B}` becomes `A` or `B`,
//! - `{"$switch": "expr", "label": A, ...}` becomes the branch whose key
//!   equals the stringified value of `expr`,
//! - `{"$eval": "expr"}` becomes the raw value of `expr`,
//! - `{"$fromNow": "2 days 3 hours"}` becomes an ISO-8601 UTC timestamp.
//!
//! Array fields in the context also gain `$name` accessors, so `$items(1)`
//! yields the second element of `items`.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//!
//! let template = json!({
//!     "greeting": "Hello ${user.name}",
//!     "tier": {"$if": "user.points > 100", "$then": "gold", "$else": "basic"},
//!     "first": {"$eval": "$orders(0)"}
//! });
//! let context = json!({"user": {"name": "Ada", "points": 250}, "orders": [7, 9]});
//!
//! let rendered = jtemplate_core::render_json(&template, &context).unwrap();
//! assert_eq!(
//!     rendered,
//!     json!({"greeting": "Hello Ada", "tier": "gold", "first": 7})
//! );
//! ```

pub mod clock;
pub mod context;
pub mod directive;
pub mod error;
pub mod evaluator;
pub mod from_now;
pub mod interpolate;
pub mod options;
pub mod renderer;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{Context, prepare_context};
pub use directive::DirectiveKind;
pub use error::{RenderError, RenderResult};
pub use evaluator::{ExpressionEvaluator, StandardEvaluator};
pub use interpolate::interpolate;
pub use options::RenderOptions;
pub use renderer::{Renderer, render, render_json};

pub use jtemplate_expr::{ExpressionError, Map, Value};
