/*
 * directive.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Reserved directive keys and their precedence.

use std::fmt;

use jtemplate_expr::Map;

/// Companion key holding the branch taken when `$if` is truthy.
pub const THEN_KEY: &str = "$then";

/// Companion key holding the branch taken when `$if` is falsy.
pub const ELSE_KEY: &str = "$else";

/// The four directives a mapping node can carry.
///
/// Variants are declared in priority order, so the derived `Ord` is the
/// precedence used when a node carries several reserved keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectiveKind {
    If,
    Switch,
    Eval,
    FromNow,
}

impl DirectiveKind {
    /// All directives, highest priority first.
    pub const PRIORITY: [DirectiveKind; 4] = [
        DirectiveKind::If,
        DirectiveKind::Switch,
        DirectiveKind::Eval,
        DirectiveKind::FromNow,
    ];

    /// The reserved key for this directive.
    pub fn key(self) -> &'static str {
        match self {
            DirectiveKind::If => "$if",
            DirectiveKind::Switch => "$switch",
            DirectiveKind::Eval => "$eval",
            DirectiveKind::FromNow => "$fromNow",
        }
    }

    /// Every directive whose key is present in `node`, highest priority first.
    pub fn present_in(node: &Map) -> Vec<DirectiveKind> {
        Self::PRIORITY
            .into_iter()
            .filter(|kind| node.contains_key(kind.key()))
            .collect()
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jtemplate_expr::Value;

    fn node(keys: &[&str]) -> Map {
        keys.iter()
            .map(|k| (k.to_string(), Value::from("x")))
            .collect()
    }

    #[test]
    fn test_priority_order() {
        assert!(DirectiveKind::If < DirectiveKind::Switch);
        assert!(DirectiveKind::Switch < DirectiveKind::Eval);
        assert!(DirectiveKind::Eval < DirectiveKind::FromNow);
    }

    #[test]
    fn test_present_in_orders_by_priority() {
        assert_eq!(
            DirectiveKind::present_in(&node(&["$fromNow", "$eval"])),
            vec![DirectiveKind::Eval, DirectiveKind::FromNow]
        );
        assert_eq!(
            DirectiveKind::present_in(&node(&["$eval", "$switch", "$if"])).first(),
            Some(&DirectiveKind::If)
        );
        assert!(DirectiveKind::present_in(&node(&["$then", "if", "eval"])).is_empty());
    }

    #[test]
    fn test_present_in() {
        assert_eq!(
            DirectiveKind::present_in(&node(&["$fromNow", "a", "$switch"])),
            vec![DirectiveKind::Switch, DirectiveKind::FromNow]
        );
        assert!(DirectiveKind::present_in(&node(&["a"])).is_empty());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        assert_eq!(
            DirectiveKind::present_in(&node(&["$fromNow"])),
            vec![DirectiveKind::FromNow]
        );
        assert!(DirectiveKind::present_in(&node(&["$fromnow", "$IF"])).is_empty());
    }
}
