/*
 * renderer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template rendering.
//!
//! Rendering walks the template depth-first in insertion order and rewrites
//! it in place:
//!
//! - strings are interpolated,
//! - a mapping carrying a reserved key is replaced by the result of its
//!   directive,
//! - other mappings and sequences are walked recursively,
//! - other scalars are left alone.
//!
//! The caller's template and context are never modified: the renderer works
//! on its own copies and returns the rewritten template.

use std::borrow::Cow;

use jtemplate_expr::{Map, Value};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::context::{Context, prepare_context};
use crate::directive::{DirectiveKind, ELSE_KEY, THEN_KEY};
use crate::error::{RenderError, RenderResult};
use crate::evaluator::{ExpressionEvaluator, StandardEvaluator};
use crate::from_now;
use crate::interpolate::interpolate;
use crate::options::RenderOptions;

/// Render `template` against `context` with default options.
pub fn render(template: &Value, context: &Context) -> RenderResult<Value> {
    Renderer::new().render(template, context)
}

/// Render JSON `template` against a JSON object `context`.
pub fn render_json(
    template: &serde_json::Value,
    context: &serde_json::Value,
) -> RenderResult<serde_json::Value> {
    Renderer::new().render_json(template, context)
}

/// A configured template renderer.
///
/// The expression evaluator and the clock used by `$fromNow` are pluggable;
/// the defaults are [`StandardEvaluator`] and [`SystemClock`].
#[derive(Debug, Clone, Default)]
pub struct Renderer<E = StandardEvaluator, C = SystemClock> {
    evaluator: E,
    clock: C,
    options: RenderOptions,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E, C> Renderer<E, C>
where
    E: ExpressionEvaluator,
    C: Clock,
{
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_evaluator<E2: ExpressionEvaluator>(self, evaluator: E2) -> Renderer<E2, C> {
        Renderer {
            evaluator,
            clock: self.clock,
            options: self.options,
        }
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> Renderer<E, C2> {
        Renderer {
            evaluator: self.evaluator,
            clock,
            options: self.options,
        }
    }

    /// Render `template` against `context`.
    ///
    /// The root is handled like any other node, so a root directive such as
    /// `{"$eval": "1 + 2"}` renders to `3`.
    pub fn render(&self, template: &Value, context: &Context) -> RenderResult<Value> {
        let mut context = context.clone();
        prepare_context(&mut context);
        debug!(
            fields = context.len(),
            strict = self.options.strict_directives,
            "rendering template"
        );

        let pass = RenderPass {
            evaluator: &self.evaluator,
            clock: &self.clock,
            context: &context,
            options: &self.options,
        };
        let mut output = template.clone();
        pass.render_node(&mut output, 0)?;
        Ok(output)
    }

    /// Render with JSON input and output.
    ///
    /// Fails with [`RenderError::InvalidContext`] if `context` is not an
    /// object, and with [`RenderError::Json`] if the result is a bare array
    /// accessor (for example `{"$eval": "$items"}`).
    pub fn render_json(
        &self,
        template: &serde_json::Value,
        context: &serde_json::Value,
    ) -> RenderResult<serde_json::Value> {
        let context = match Value::from(context.clone()) {
            Value::Object(map) => map,
            other => {
                return Err(RenderError::InvalidContext {
                    found: other.type_name(),
                });
            }
        };
        let rendered = self.render(&Value::from(template.clone()), &context)?;
        Ok(rendered.to_json()?)
    }
}

/// State shared by one render call.
struct RenderPass<'r, E: ?Sized, C: ?Sized> {
    evaluator: &'r E,
    clock: &'r C,
    context: &'r Context,
    options: &'r RenderOptions,
}

impl<E, C> RenderPass<'_, E, C>
where
    E: ExpressionEvaluator + ?Sized,
    C: Clock + ?Sized,
{
    fn render_node(&self, node: &mut Value, depth: usize) -> RenderResult<()> {
        if depth > self.options.max_depth {
            return Err(RenderError::DepthExceeded {
                max_depth: self.options.max_depth,
            });
        }

        match node {
            Value::String(text) => {
                let rendered = match interpolate(text, self.evaluator, self.context)? {
                    Cow::Owned(rendered) => Some(rendered),
                    Cow::Borrowed(_) => None,
                };
                if let Some(rendered) = rendered {
                    *text = rendered;
                }
            }
            Value::Object(map) => match self.detect(map)? {
                Some(kind) => {
                    let directive = std::mem::take(map);
                    *node = self.apply(kind, directive, depth)?;
                }
                None => {
                    for value in map.values_mut() {
                        self.render_node(value, depth + 1)?;
                    }
                }
            },
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.render_node(item, depth + 1)?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// The directive to apply to `node`, honoring strict mode.
    fn detect(&self, node: &Map) -> RenderResult<Option<DirectiveKind>> {
        let present = DirectiveKind::present_in(node);
        match present.as_slice() {
            [] => Ok(None),
            [kind] => Ok(Some(*kind)),
            [kind, ignored @ ..] => {
                if self.options.strict_directives {
                    return Err(RenderError::AmbiguousDirective {
                        keys: present.clone(),
                    });
                }
                let ignored: Vec<&str> = ignored.iter().map(|k| k.key()).collect();
                warn!(
                    honored = %kind,
                    ?ignored,
                    "node has several directive keys; lower-priority keys are left as data"
                );
                Ok(Some(*kind))
            }
        }
    }

    fn apply(&self, kind: DirectiveKind, mut node: Map, depth: usize) -> RenderResult<Value> {
        debug!(directive = %kind, depth, "applying directive");

        match kind {
            DirectiveKind::If => {
                let condition = self.evaluate_control(&node, kind)?;
                let branch_key = if condition.is_truthy() {
                    THEN_KEY
                } else {
                    ELSE_KEY
                };
                let branch = node
                    .swap_remove(branch_key)
                    .ok_or(RenderError::MissingBranch { branch: branch_key })?;
                self.resolve_branch(branch, depth)
            }
            DirectiveKind::Switch => {
                let label = self.evaluate_control(&node, kind)?.to_string();
                let branch = node
                    .swap_remove(&label)
                    .ok_or(RenderError::MissingCase { label })?;
                self.resolve_branch(branch, depth)
            }
            DirectiveKind::Eval => self.evaluate_control(&node, kind),
            DirectiveKind::FromNow => {
                let expression = control_str(&node, kind)?;
                from_now::resolve(expression, self.clock.now()).map(Value::String)
            }
        }
    }

    /// Render the branch a directive selected; it replaces the directive.
    fn resolve_branch(&self, mut branch: Value, depth: usize) -> RenderResult<Value> {
        self.render_node(&mut branch, depth + 1)?;
        Ok(branch)
    }

    fn evaluate_control(&self, node: &Map, kind: DirectiveKind) -> RenderResult<Value> {
        let source = control_str(node, kind)?;
        Ok(self.evaluator.evaluate(source, self.context)?)
    }
}

/// The string held by a directive's reserved key.
fn control_str(node: &Map, kind: DirectiveKind) -> RenderResult<&str> {
    match node.get(kind.key()) {
        Some(Value::String(source)) => Ok(source),
        _ => Err(RenderError::InvalidConstruct { directive: kind }),
    }
}
