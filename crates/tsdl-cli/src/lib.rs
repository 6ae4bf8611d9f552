//! # tsdl-cli: Command-Line Front End for TSDL Field Path Resolution
//!
//! Provides the `tsdl` binary.
//!
//! ## Subcommands
//!
//! - `tsdl check`: run the metadata pipeline and report resolved references.
//! - `tsdl resolve`: run the pipeline and emit the completed trace class.
//!
//! ```bash
//! tsdl check metadata.yaml
//! tsdl --config resolve.yaml resolve metadata.json -o resolved.json
//! ```
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when the schema is rejected, `2` when a file cannot
//! be read, parsed or written.

pub mod check;
pub mod load;
pub mod report;
pub mod resolve;
