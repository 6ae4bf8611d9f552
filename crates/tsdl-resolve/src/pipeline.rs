//! # Metadata Pipeline
//!
//! The passes a freshly parsed trace class goes through before it can be
//! translated: configuration and name checks, field path resolution, and
//! the text array pass. Each step runs only if the previous one succeeded.

use serde::Serialize;
use thiserror::Error;
use tsdl_core::{SchemaError, TraceClass};

use crate::config::{ConfigError, ResolveConfig};
use crate::error::ResolveError;
use crate::text::update_text_arrays;
use crate::walker::{ResolveSummary, Resolver};

/// A failed pipeline step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The schema repeats a member name.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// Field path resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// What the pipeline changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Variant tag paths written.
    pub variant_tags: usize,
    /// Sequence length paths written.
    pub sequence_lengths: usize,
    /// Arrays and sequences marked as text.
    pub text_arrays: usize,
}

impl From<ResolveSummary> for PipelineReport {
    fn from(summary: ResolveSummary) -> Self {
        Self {
            variant_tags: summary.variant_tags,
            sequence_lengths: summary.sequence_lengths,
            text_arrays: 0,
        }
    }
}

/// Run every pass over `tc`.
///
/// # Errors
///
/// Returns the first failing step's error. If resolution fails, `tc` is
/// unchanged.
pub fn prepare_trace_class(
    tc: &mut TraceClass,
    config: &ResolveConfig,
) -> Result<PipelineReport, PipelineError> {
    config.validate()?;
    tc.check_unique_names()?;

    let summary = Resolver::new(config.clone()).resolve_trace_class(tc)?;
    let mut report = PipelineReport::from(summary);
    if config.update_text_arrays {
        report.text_arrays = update_text_arrays(tc);
    }
    tracing::info!(
        variant_tags = report.variant_tags,
        sequence_lengths = report.sequence_lengths,
        text_arrays = report.text_arrays,
        "metadata pipeline complete"
    );
    Ok(report)
}
