/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Context preparation.
//!
//! Before rendering, every array-valued field of the context gets a sibling
//! accessor named `"$" + key`, so expressions can index arrays with call
//! syntax: `{"items": [10, 20]}` gains `"$items"` and `$items(1)` yields `20`.
//! This applies at every nesting depth. Arrays held directly inside arrays
//! cannot carry named siblings; the evaluator resolves `$<index>` on the
//! outer array instead, so `matrix.$0(1)` still works.

use indexmap::map::Entry;
use jtemplate_expr::{ArrayAccessor, Map, Value};
use tracing::{debug, warn};

/// The data environment a template is rendered against.
pub type Context = Map;

/// Inject array accessors throughout `context`.
///
/// Existing keys are never overwritten: if the context already holds a field
/// named like a synthesized accessor, the field wins. Running this twice is
/// harmless because accessors are not arrays.
pub fn prepare_context(context: &mut Context) {
    let added = prepare_map(context);
    debug!(accessors = added, "prepared template context");
}

fn prepare_map(map: &mut Map) -> usize {
    let mut added = 0;
    let mut accessors = Vec::new();

    for (key, value) in map.iter_mut() {
        // Prepare nested containers first so accessor snapshots include
        // their own accessors.
        added += prepare_value(value);
        if let Value::Array(items) = value {
            accessors.push((format!("${key}"), ArrayAccessor::new(items.clone())));
        }
    }

    for (name, accessor) in accessors {
        match map.entry(name) {
            Entry::Occupied(existing) if matches!(existing.get(), Value::Function(_)) => {}
            Entry::Occupied(existing) => {
                warn!(
                    key = %existing.key(),
                    "context field shadows a synthesized array accessor"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(Value::Function(accessor));
                added += 1;
            }
        }
    }

    added
}

fn prepare_value(value: &mut Value) -> usize {
    match value {
        Value::Object(map) => prepare_map(map),
        Value::Array(items) => items.iter_mut().map(prepare_value).sum(),
        _ => 0,
    }
}
