//! # Schema and Configuration Files
//!
//! Trace classes are read from JSON or YAML, picked by file extension
//! (`.json` is JSON, anything else YAML). The configuration file is always
//! parsed as YAML, which also accepts JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tsdl_core::TraceClass;
use tsdl_resolve::ResolveConfig;

/// Document format of a trace class file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// JSON.
    Json,
    /// YAML.
    Yaml,
}

impl Format {
    /// Format implied by `path`'s extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Read a trace class from `path`.
pub fn load_trace_class(path: &Path) -> Result<TraceClass> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tc: TraceClass = match Format::from_path(path) {
        Format::Json => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?,
        Format::Yaml => serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?,
    };
    tracing::debug!(
        path = %path.display(),
        stream_classes = tc.stream_classes.len(),
        "loaded trace class"
    );
    Ok(tc)
}

/// Read and check the resolution configuration, or use the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ResolveConfig> {
    let Some(path) = path else {
        return Ok(ResolveConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ResolveConfig = if text.trim().is_empty() {
        ResolveConfig::default()
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?
    };
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Serialize a trace class.
pub fn render(tc: &TraceClass, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let mut text = serde_json::to_string_pretty(tc).context("failed to serialize JSON")?;
            text.push('\n');
            Ok(text)
        }
        Format::Yaml => serde_yaml::to_string(tc).context("failed to serialize YAML"),
    }
}
