/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render configuration.

use serde::{Deserialize, Serialize};

/// Default maximum template nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options controlling how a template is rendered.
///
/// Options can be loaded from JSON (`{"strict-directives": true}`); absent
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderOptions {
    /// Reject nodes that carry more than one reserved directive key.
    ///
    /// When off, only the highest-priority key is honored and the others
    /// are left as ordinary fields.
    pub strict_directives: bool,

    /// Maximum nesting depth of the template before rendering fails.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict_directives: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict directive detection.
    pub fn with_strict_directives(mut self, strict: bool) -> Self {
        self.strict_directives = strict;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
