/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Reads a template and a context, renders with jtemplate-core and writes
//! the resulting JSON document. Render options come from `--config` (a JSON
//! file of [`RenderOptions`]); `--strict` and `--max-depth` override it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use jtemplate_core::{RenderOptions, Renderer};

use super::{load_context, read_json, to_json_text};

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Template file, or `-` for stdin
    pub template: PathBuf,
    /// Context file
    pub context: Option<PathBuf>,
    /// `KEY=JSON` context overrides
    pub set: Vec<String>,
    /// Render options file
    pub config: Option<PathBuf>,
    pub strict: bool,
    pub max_depth: Option<usize>,
    pub compact: bool,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let options = resolve_options(&args)?;
    debug!(?options, "render options");

    let template = read_json(&args.template)?;
    let context = load_context(args.context.as_deref(), &args.set)?;

    let rendered = Renderer::new()
        .with_options(options)
        .render_json(&template, &context)
        .with_context(|| format!("Failed to render {}", args.template.display()))?;

    let mut text = to_json_text(&rendered, args.compact)?;
    text.push('\n');

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Rendered {} to {}", args.template.display(), path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}

/// Merge the options file with command-line flags.
fn resolve_options(args: &RenderArgs) -> Result<RenderOptions> {
    let mut options = match &args.config {
        Some(path) => serde_json::from_value(read_json(path)?)
            .with_context(|| format!("Invalid render options in {}", path.display()))?,
        None => RenderOptions::default(),
    };
    if args.strict {
        options = options.with_strict_directives(true);
    }
    if let Some(depth) = args.max_depth {
        options = options.with_max_depth(depth);
    }
    Ok(options)
}
