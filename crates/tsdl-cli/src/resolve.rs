//! # Resolve Subcommand
//!
//! Runs the metadata pipeline and emits the completed trace class, with
//! every variant tag and sequence length path filled in.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tsdl_resolve::{prepare_trace_class, ResolveConfig};

use crate::load::{load_trace_class, render, Format};

/// Arguments for the `tsdl resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Trace class file (`.json`, otherwise YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Write the resolved trace class here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format. Defaults to the output file's format, else the input's.
    #[arg(long, value_enum)]
    pub format: Option<Format>,
}

/// Execute the resolve subcommand.
///
/// Returns exit code: 0 on success, 1 if the pipeline rejects the schema.
/// No output is written on failure.
pub fn run_resolve(args: &ResolveArgs, config: &ResolveConfig) -> Result<u8> {
    let mut tc = load_trace_class(&args.path)?;

    if let Err(e) = prepare_trace_class(&mut tc, config) {
        println!("FAIL: {}: {e}", args.path.display());
        return Ok(1);
    }

    let format = args.format.unwrap_or_else(|| {
        Format::from_path(args.output.as_deref().unwrap_or(args.path.as_path()))
    });
    let text = render(&tc, format)?;
    match &args.output {
        Some(output) => {
            fs::write(output, text)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(output = %output.display(), "resolved trace class written");
        }
        None => print!("{text}"),
    }
    Ok(0)
}
