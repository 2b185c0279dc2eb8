/*
 * eval.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tree-walking evaluation of parsed expressions.
//!
//! Evaluation is pure: the context is only read, and the only callables are
//! [`ArrayAccessor`]s. Those come from the context, or from `$<n>` on an
//! array whose element `n` is itself an array (`matrix.$0(1)`).
//! Lookups borrow from the context where possible and only allocate for
//! computed values.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{ExprResult, ExpressionError};
use crate::parser::parse;
use crate::value::{ArrayAccessor, Map, Value};

/// Parse and evaluate `source` against `context`.
pub fn evaluate(source: &str, context: &Map) -> ExprResult<Value> {
    let expr = parse(source)?;
    eval_expr(&expr, context)
}

/// Evaluate an already parsed expression.
pub fn eval_expr(expr: &Expr, context: &Map) -> ExprResult<Value> {
    eval(expr, context).map(Cow::into_owned)
}

fn eval<'a>(expr: &Expr, context: &'a Map) -> ExprResult<Cow<'a, Value>> {
    match expr {
        Expr::Literal(value) => Ok(Cow::Owned(value.clone())),

        Expr::Ident(name) => context
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| ExpressionError::UndefinedReference { name: name.clone() }),

        Expr::Array(items) => {
            let values: ExprResult<Vec<Value>> =
                items.iter().map(|item| eval_expr(item, context)).collect();
            Ok(Cow::Owned(Value::Array(values?)))
        }

        Expr::Member { object, property } => {
            let target = eval(object, context)?;
            project(target, |value| member(value, property))
        }

        Expr::Index { object, index } => {
            let target = eval(object, context)?;
            let key = eval(index, context)?;
            project(target, |value| element(value, &key))
        }

        Expr::Call { callee, args } => {
            let function = eval(callee, context)?;
            let Value::Function(accessor) = function.as_ref() else {
                return Err(ExpressionError::NotCallable {
                    name: callee.describe(),
                });
            };
            let index = match args.first() {
                Some(arg) => eval(arg, context)?,
                None => Cow::Owned(Value::Null),
            };
            Ok(Cow::Owned(accessor.call(&index)))
        }

        Expr::Unary { op, operand } => {
            let value = eval(operand, context)?;
            unary(*op, &value).map(Cow::Owned)
        }

        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            let lhs = eval(left, context)?;
            if lhs.is_truthy() {
                eval(right, context)
            } else {
                Ok(lhs)
            }
        }

        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            let lhs = eval(left, context)?;
            if lhs.is_truthy() {
                Ok(lhs)
            } else {
                eval(right, context)
            }
        }

        Expr::Binary { op, left, right } => {
            let lhs = eval(left, context)?;
            let rhs = eval(right, context)?;
            binary(*op, &lhs, &rhs).map(Cow::Owned)
        }

        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if eval(test, context)?.is_truthy() {
                eval(consequent, context)
            } else {
                eval(alternate, context)
            }
        }
    }
}

/// Apply a borrowing lookup to a value that may itself be borrowed or owned.
fn project<'a, F>(target: Cow<'a, Value>, lookup: F) -> ExprResult<Cow<'a, Value>>
where
    F: for<'v> Fn(&'v Value) -> ExprResult<Cow<'v, Value>>,
{
    match target {
        Cow::Borrowed(value) => lookup(value),
        Cow::Owned(value) => lookup(&value).map(|found| Cow::Owned(found.into_owned())),
    }
}

fn member<'v>(value: &'v Value, name: &str) -> ExprResult<Cow<'v, Value>> {
    match value {
        Value::Object(map) => map
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| ExpressionError::UndefinedReference {
                name: name.to_string(),
            }),
        Value::Array(items) if name == "length" => Ok(Cow::Owned(Value::Int(items.len() as i64))),
        Value::String(s) if name == "length" => {
            Ok(Cow::Owned(Value::Int(s.chars().count() as i64)))
        }
        Value::Array(items) => element_accessor(items, name)
            .map(Cow::Owned)
            .ok_or_else(|| {
                ExpressionError::type_error(format!("cannot read property '{name}' of array"))
            }),
        other => Err(ExpressionError::type_error(format!(
            "cannot read property '{name}' of {}",
            other.type_name()
        ))),
    }
}

/// The accessor `$<n>` names on `items`, if element `n` is an array.
fn element_accessor(items: &[Value], name: &str) -> Option<Value> {
    let digits = name
        .strip_prefix('$')
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))?;
    match items.get(digits.parse::<usize>().ok()?)? {
        Value::Array(inner) => Some(Value::Function(ArrayAccessor::new(inner.clone()))),
        _ => None,
    }
}

fn element<'v>(value: &'v Value, key: &Value) -> ExprResult<Cow<'v, Value>> {
    match (value, key) {
        (Value::Array(_), Value::String(name)) => member(value, name),
        (Value::Array(items), _) => Ok(as_index(key)
            .and_then(|i| items.get(i))
            .map_or(Cow::Owned(Value::Null), Cow::Borrowed)),
        (Value::Object(_), Value::String(name)) => member(value, name),
        (Value::Object(_), other) => member(value, &other.to_string()),
        (Value::String(s), _) => Ok(Cow::Owned(
            as_index(key)
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Null, |c| Value::String(c.to_string())),
        )),
        (other, _) => Err(ExpressionError::type_error(format!(
            "cannot index into {}",
            other.type_name()
        ))),
    }
}

fn as_index(key: &Value) -> Option<usize> {
    match key {
        Value::Int(n) => usize::try_from(*n).ok(),
        Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
        _ => None,
    }
}

fn unary(op: UnaryOp, value: &Value) -> ExprResult<Value> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => Ok(n
            .checked_neg()
            .map_or(Value::Float(-(*n as f64)), Value::Int)),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Plus, v @ (Value::Int(_) | Value::Float(_))) => Ok(v.clone()),
        (_, v) => Err(ExpressionError::type_error(format!(
            "cannot apply unary operator to {}",
            v.type_name()
        ))),
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExprResult<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::NotEq => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = compare(op, lhs, rhs)?;
            Ok(Value::Bool(match (op, ordering) {
                (_, None) => false,
                (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
                (BinaryOp::LtEq, Some(o)) => o != Ordering::Greater,
                (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            }))
        }
        BinaryOp::Add if lhs.as_str().is_some() || rhs.as_str().is_some() => {
            Ok(Value::String(format!("{lhs}{rhs}")))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, lhs, rhs)
        }
        // `eval` short-circuits these; this is the eager form
        BinaryOp::And => Ok(if lhs.is_truthy() { rhs } else { lhs }.clone()),
        BinaryOp::Or => Ok(if lhs.is_truthy() { lhs } else { rhs }.clone()),
    }
}

/// `None` means unordered (a NaN operand), which makes every comparison false.
fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExprResult<Option<Ordering>> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(type_mismatch(op, lhs, rhs)),
        },
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExprResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let (a, b) = (*a, *b);
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div if b == 0 => return Err(ExpressionError::DivisionByZero),
            BinaryOp::Div if a % b == 0 => a.checked_div(b),
            BinaryOp::Div => None,
            BinaryOp::Mod if b == 0 => return Err(ExpressionError::DivisionByZero),
            BinaryOp::Mod => a.checked_rem(b),
            _ => None,
        };
        if let Some(n) = exact {
            return Ok(Value::Int(n));
        }
    }

    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(type_mismatch(op, lhs, rhs));
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Err(ExpressionError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Mod if b == 0.0 => return Err(ExpressionError::DivisionByZero),
        BinaryOp::Mod => a % b,
        _ => return Err(type_mismatch(op, lhs, rhs)),
    };
    Ok(Value::Float(result))
}

fn type_mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> ExpressionError {
    ExpressionError::type_error(format!(
        "cannot apply '{}' to {} and {}",
        op.symbol(),
        lhs.type_name(),
        rhs.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(json: serde_json::Value) -> Map {
        match Value::from(json) {
            Value::Object(map) => map,
            _ => panic!("context must be an object"),
        }
    }

    fn eval_in(source: &str, context: &Map) -> Value {
        evaluate(source, context).unwrap_or_else(|e| panic!("{source}: {e}"))
    }

    #[test]
    fn test_arithmetic() {
        let c = Map::new();
        assert_eq!(eval_in("1+2", &c), Value::Int(3));
        assert!(matches!(eval_in("1+2", &c), Value::Int(3)));
        assert_eq!(eval_in("7 / 2", &c), Value::Float(3.5));
        assert!(matches!(eval_in("6 / 2", &c), Value::Int(3)));
        assert_eq!(eval_in("7 % 3", &c), Value::Int(1));
        assert_eq!(eval_in("-7 % 3", &c), Value::Int(-1));
        assert_eq!(eval_in("2 * 1.5", &c), Value::Float(3.0));
        assert_eq!(eval_in("(1 + 2) * 3", &c), Value::Int(9));
        assert_eq!(eval_in("-(2)", &c), Value::Int(-2));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let c = Map::new();
        assert!(matches!(
            eval_in("9223372036854775807 + 1", &c),
            Value::Float(_)
        ));
    }

    #[test]
    fn test_division_by_zero() {
        let c = Map::new();
        assert_eq!(
            evaluate("1 / 0", &c).unwrap_err(),
            ExpressionError::DivisionByZero
        );
        assert_eq!(
            evaluate("1.5 % 0", &c).unwrap_err(),
            ExpressionError::DivisionByZero
        );
    }

    #[test]
    fn test_string_concatenation() {
        let c = ctx(json!({"name": "world", "n": 2}));
        assert_eq!(eval_in("'hello ' + name", &c), Value::from("hello world"));
        assert_eq!(eval_in("n + 'x'", &c), Value::from("2x"));
    }

    #[test]
    fn test_comparisons() {
        let c = ctx(json!({"a": 1, "s": "abc"}));
        assert_eq!(eval_in("a > 0", &c), Value::Bool(true));
        assert_eq!(eval_in("a >= 1.5", &c), Value::Bool(false));
        assert_eq!(eval_in("s < 'abd'", &c), Value::Bool(true));
        assert_eq!(eval_in("a == 1.0", &c), Value::Bool(true));
        assert_eq!(eval_in("s != 'abc'", &c), Value::Bool(false));
        assert!(matches!(
            evaluate("s < 1", &c).unwrap_err(),
            ExpressionError::Type { .. }
        ));
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        let c = ctx(json!({"a": 0, "b": "x"}));
        assert_eq!(eval_in("a || b", &c), Value::from("x"));
        assert_eq!(eval_in("a && missing", &c), Value::Int(0));
        assert_eq!(eval_in("b || missing", &c), Value::from("x"));
        assert_eq!(eval_in("!a", &c), Value::Bool(true));
        assert!(matches!(
            evaluate("b && missing", &c).unwrap_err(),
            ExpressionError::UndefinedReference { .. }
        ));
    }

    #[test]
    fn test_conditional() {
        let c = ctx(json!({"a": 1}));
        assert_eq!(eval_in("a > 0 ? 'pos' : 'neg'", &c), Value::from("pos"));
        // Only the taken branch is evaluated
        assert_eq!(eval_in("a > 0 ? 'pos' : missing", &c), Value::from("pos"));
    }

    #[test]
    fn test_member_and_index_access() {
        let c = ctx(json!({
            "user": {"name": "ada", "tags": ["x", "y"]},
            "key": "name"
        }));
        assert_eq!(eval_in("user.name", &c), Value::from("ada"));
        assert_eq!(eval_in("user['name']", &c), Value::from("ada"));
        assert_eq!(eval_in("user[key]", &c), Value::from("ada"));
        assert_eq!(eval_in("user.tags[1]", &c), Value::from("y"));
        assert_eq!(eval_in("user.tags[5]", &c), Value::Null);
        assert_eq!(eval_in("user.tags.length", &c), Value::Int(2));
        assert_eq!(eval_in("user.name[0]", &c), Value::from("a"));
        assert_eq!(eval_in("[1, 2, 3][2]", &c), Value::Int(3));
    }

    #[test]
    fn test_undefined_references() {
        let c = ctx(json!({"user": {"name": "ada"}}));
        assert_eq!(
            evaluate("nobody", &c).unwrap_err(),
            ExpressionError::UndefinedReference {
                name: "nobody".to_string()
            }
        );
        assert_eq!(
            evaluate("user.age", &c).unwrap_err(),
            ExpressionError::UndefinedReference {
                name: "age".to_string()
            }
        );
        assert!(matches!(
            evaluate("user.name.first", &c).unwrap_err(),
            ExpressionError::Type { .. }
        ));
    }

    #[test]
    fn test_nested_array_index_accessors() {
        let c = ctx(json!({"matrix": [[1, 2], [3, [4, 5]]], "mixed": [1, [2]]}));
        assert_eq!(eval_in("matrix.$0(1)", &c), Value::Int(2));
        assert_eq!(eval_in("matrix.$1(0)", &c), Value::Int(3));
        assert_eq!(eval_in("matrix[1].$1(1)", &c), Value::Int(5));
        assert_eq!(eval_in("matrix['$0'](0)", &c), Value::Int(1));
        assert_eq!(eval_in("mixed.$1(0)", &c), Value::Int(2));
        // Only elements that are arrays get an accessor
        assert!(matches!(
            evaluate("mixed.$0(0)", &c).unwrap_err(),
            ExpressionError::Type { .. }
        ));
        assert!(matches!(
            evaluate("matrix.$7(0)", &c).unwrap_err(),
            ExpressionError::Type { .. }
        ));
    }

    #[test]
    fn test_long_expression_is_an_error() {
        let c = Map::new();
        let source = vec!["1"; 20_000].join("+");
        assert!(matches!(
            evaluate(&source, &c).unwrap_err(),
            ExpressionError::Syntax { .. }
        ));
    }

    #[test]
    fn test_accessor_calls() {
        let mut c = ctx(json!({"items": [10, 20, 30]}));
        c.insert(
            "$items".to_string(),
            Value::Function(ArrayAccessor::new(vec![
                Value::Int(10),
                Value::Int(20),
                Value::Int(30),
            ])),
        );
        assert_eq!(eval_in("$items(1)", &c), Value::Int(20));
        assert_eq!(eval_in("$items(1 + 1)", &c), Value::Int(30));
        assert_eq!(eval_in("$items(9)", &c), Value::Null);
        assert_eq!(eval_in("$items()", &c), Value::Null);
        assert_eq!(
            evaluate("items(1)", &c).unwrap_err(),
            ExpressionError::NotCallable {
                name: "items".to_string()
            }
        );
    }
}
