//! # Check Subcommand
//!
//! Runs the metadata pipeline over a trace class file and reports what it
//! resolved. Nothing is written back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tsdl_resolve::{prepare_trace_class, PipelineReport, ResolveConfig};

use crate::load::load_trace_class;
use crate::report::{references, ReferenceEntry};

/// Arguments for the `tsdl check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Trace class file (`.json`, otherwise YAML).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CheckOutput {
    report: PipelineReport,
    references: Vec<ReferenceEntry>,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 on success, 1 if the pipeline rejects the schema.
/// Unreadable files are errors.
pub fn run_check(args: &CheckArgs, config: &ResolveConfig) -> Result<u8> {
    let mut tc = load_trace_class(&args.path)?;

    let report = match prepare_trace_class(&mut tc, config) {
        Ok(report) => report,
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            return Ok(1);
        }
    };

    let references = references(&tc);
    if args.json {
        let output = CheckOutput { report, references };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("failed to serialize report")?
        );
    } else {
        println!(
            "OK: {}: {} variant tag(s), {} sequence length(s), {} text array(s)",
            args.path.display(),
            report.variant_tags,
            report.sequence_lengths,
            report.text_arrays
        );
        for entry in &references {
            println!("  {entry}");
        }
    }
    Ok(0)
}
