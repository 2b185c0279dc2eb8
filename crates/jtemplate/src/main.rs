/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! jtemplate CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "jtemplate")]
#[command(version)]
#[command(about = "Render declarative JSON templates", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON template against a context
    Render {
        /// Template file ('-' for stdin)
        template: PathBuf,

        /// JSON file holding the context object
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Set a context field (KEY=JSON, KEY may be a dotted path)
        #[arg(short, long = "set", value_name = "KEY=JSON")]
        set: Vec<String>,

        /// JSON file with render options
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reject nodes carrying more than one directive key
        #[arg(long)]
        strict: bool,

        /// Maximum template nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print compact JSON instead of pretty-printing
        #[arg(long)]
        compact: bool,

        /// Write output to FILE instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve a relative-date expression against the current time
    FromNow {
        /// Expression such as "2 days 3 hours"
        expression: String,
    },

    /// Evaluate a single expression against a context
    Eval {
        /// Expression source
        expression: String,

        /// JSON file holding the context object
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Set a context field (KEY=JSON, KEY may be a dotted path)
        #[arg(short, long = "set", value_name = "KEY=JSON")]
        set: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so rendered output can be piped
    let default_filter = if cli.verbose {
        "jtemplate=debug,jtemplate_core=debug"
    } else {
        "jtemplate=info,jtemplate_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Render {
            template,
            context,
            set,
            config,
            strict,
            max_depth,
            compact,
            output,
        } => commands::render::execute(commands::render::RenderArgs {
            template,
            context,
            set,
            config,
            strict,
            max_depth,
            compact,
            output,
        }),
        Commands::FromNow { expression } => commands::from_now::execute(&expression),
        Commands::Eval {
            expression,
            context,
            set,
        } => commands::eval::execute(&expression, context.as_deref(), &set),
    }
}
