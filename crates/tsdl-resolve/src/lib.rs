//! # tsdl-resolve: Field Path Resolution for TSDL Metadata
//!
//! A variant names its tag field and a sequence names its length field
//! with a dotted reference such as `len`, `hdr.count` or
//! `stream.packet.context.flags`. This crate turns every such reference in
//! a [`TraceClass`](tsdl_core::TraceClass) into a
//! [`FieldPath`](tsdl_core::FieldPath) a decoder can follow without
//! comparing names, and proves that the target is decoded before the
//! referring field and has the right kind.
//!
//! ## Architecture
//!
//! - [`path`]: reference tokenizer.
//! - [`scope_table`]: scope roots and owner states for the current pass.
//! - [`stack`]: ancestors of the field being visited.
//! - [`resolver`]: reference string to path and target class.
//! - [`validate`]: ordering and kind checks on a resolved target.
//! - [`walker`]: the whole-schema pass, committing only on success.
//! - [`text`]: marks UTF-8 byte arrays and sequences as text.
//! - [`pipeline`]: all passes in order, driven by [`ResolveConfig`].
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - A failed resolution pass leaves the trace class unchanged.

pub mod config;
pub mod error;
pub mod path;
pub mod pipeline;
pub mod resolver;
pub mod scope_table;
pub mod stack;
pub mod text;
pub mod validate;
pub mod walker;

pub use config::{ConfigError, ResolveConfig, DEFAULT_MAX_DEPTH};
pub use error::{
    ClassLocation, ForwardReason, PathSyntaxError, ReferenceKind, ReferenceSite, ResolveError,
    ResolveErrorKind, ScopeUnavailableReason,
};
pub use path::tokenize;
pub use pipeline::{prepare_trace_class, PipelineError, PipelineReport};
pub use resolver::{resolve, Resolution};
pub use scope_table::{OwnerStatus, ScopeTable};
pub use stack::{Frame, TraversalStack};
pub use text::update_text_arrays;
pub use validate::{lca_index, validate_target};
pub use walker::{ResolveSummary, Resolver};

/// Resolve every non-finalized scope of `tc` with the default configuration.
///
/// # Errors
///
/// Returns the first [`ResolveError`] met; `tc` is then unchanged.
pub fn resolve_trace_class(
    tc: &mut tsdl_core::TraceClass,
) -> Result<ResolveSummary, ResolveError> {
    Resolver::default().resolve_trace_class(tc)
}
