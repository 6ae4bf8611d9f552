//! # tsdl-core: Schema Model for TSDL Trace Metadata
//!
//! This crate defines the in-memory model of a trace schema as the metadata
//! parser builds it and as the resolution pass consumes and completes it.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Closed sum type for field classes.** `FieldClass` enumerates every
//!    kind of field. Consumers dispatch with exhaustive `match`; adding a
//!    kind forces every consumer to handle it.
//!
//! 2. **Ordered scopes.** `Scope` variants are declared in record order and
//!    derive `Ord`, so "earlier in the record" is a plain comparison.
//!
//! 3. **Paths, not pointers.** A resolved variant tag or sequence length is
//!    stored as a `FieldPath`. The target class is re-derived from the
//!    scope roots on demand with `ScopeRoots::field_class`.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public model types derive `Debug`, `Clone`, and `Serialize`/`Deserialize`.

pub mod error;
pub mod field_class;
pub mod field_path;
pub mod scope;
pub mod trace_class;

// Re-export primary types for ergonomic imports.
pub use error::SchemaError;
pub use field_class::{
    ArrayFieldClass, DisplayBase, Encoding, EnumFieldClass, EnumMapping, EnumRange, FieldClass,
    FloatFieldClass, IntFieldClass, NamedFieldClass, SequenceFieldClass, StringFieldClass,
    StructFieldClass, VariantFieldClass,
};
pub use field_path::{FieldIndex, FieldPath};
pub use scope::{Scope, ScopeOwner, SCOPE_COUNT};
pub use trace_class::{
    EventClass, EventClassId, ScopeRoots, StreamClass, StreamClassId, TraceClass,
};
