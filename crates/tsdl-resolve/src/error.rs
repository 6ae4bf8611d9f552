//! # Resolution Errors
//!
//! One error aborts a whole resolution pass; nothing is retried. Every
//! error names the class being resolved, and every reference error also
//! names the referring field's position, whether it is a variant tag or a
//! sequence length, and the reference text as written.
//!
//! ## Taxonomy
//!
//! - `PathSyntax`: the reference has an empty token.
//! - `ScopeUnavailable`: an absolute reference names a scope that does not
//!   exist here, or that belongs to a finalized class.
//! - `UnresolvedPath`: no field has that name along the descent.
//! - `ForwardReference`: the target is not structurally before the referrer.
//! - `SelfReference`: the target is a scope root.
//! - `TypeMismatch`: the target exists but has the wrong kind.

use std::fmt;

use thiserror::Error;
use tsdl_core::{EventClassId, FieldPath, SchemaError, Scope, ScopeOwner, StreamClassId};

/// A reference string has an empty token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("empty path token at byte {position} of `{path}`")]
pub struct PathSyntaxError {
    /// The whole reference.
    pub path: String,
    /// Byte offset where the empty token starts.
    pub position: usize,
}

/// Why a scope cannot be used as the root of an absolute reference.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeUnavailableReason {
    /// No class of the owning kind is being resolved.
    #[error("no current {0}")]
    NoOwner(ScopeOwner),

    /// The owning class was already translated.
    #[error("{0} is already finalized")]
    Finalized(ScopeOwner),

    /// The owning class does not declare this scope.
    #[error("scope is not declared")]
    NotDeclared,
}

/// Why a target is not structurally before its referrer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardReason {
    /// The target's scope comes after the referrer's scope.
    #[error("target scope comes later in the record")]
    LaterScope,

    /// One path is a prefix of the other.
    #[error("target and referrer are the same field or one contains the other")]
    Nested,

    /// At the lowest common ancestor the target index is not smaller.
    #[error("at depth {depth} the target index {target} is not before the referrer index {referrer}")]
    LaterIndex {
        /// Depth of the lowest common ancestor.
        depth: usize,
        /// Target index at that depth.
        target: i64,
        /// Referrer index at that depth.
        referrer: i64,
    },
}

/// What went wrong, independent of where.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveErrorKind {
    /// Malformed reference string.
    #[error("malformed reference: {0}")]
    PathSyntax(#[from] PathSyntaxError),

    /// The root scope of an absolute reference is unusable.
    #[error("scope {scope} is unavailable: {reason}")]
    ScopeUnavailable {
        /// The scope named by the reference.
        scope: Scope,
        /// Why it is unavailable.
        reason: ScopeUnavailableReason,
    },

    /// No field matches the reference.
    #[error("`{path}` names no reachable field from {scope}")]
    UnresolvedPath {
        /// The reference.
        path: String,
        /// The scope searched.
        scope: Scope,
    },

    /// The target does not precede the referrer.
    #[error("target {target} does not precede the referring field {referrer}: {reason}")]
    ForwardReference {
        /// Resolved target.
        target: FieldPath,
        /// Position of the referring field.
        referrer: FieldPath,
        /// Which ordering rule failed.
        reason: ForwardReason,
    },

    /// The target is a scope root.
    #[error("target is the root of scope {0}")]
    SelfReference(Scope),

    /// The target has the wrong kind.
    #[error("target {target} is a {found}, expected {expected}")]
    TypeMismatch {
        /// Resolved target.
        target: FieldPath,
        /// Required kind.
        expected: &'static str,
        /// Actual kind.
        found: &'static str,
    },

    /// Field classes nest deeper than the configured limit.
    #[error("field classes nest deeper than {limit} levels")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },

    /// A stream or event class to resolve does not exist.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Whether a reference is a variant tag or a sequence length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A variant's tag reference.
    VariantTag,
    /// A sequence's length reference.
    SequenceLength,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VariantTag => f.write_str("variant tag"),
            Self::SequenceLength => f.write_str("sequence length"),
        }
    }
}

/// The class whose scopes were being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassLocation {
    /// The trace class (packet header).
    Trace,
    /// A stream class.
    Stream(StreamClassId),
    /// An event class of a stream class.
    Event {
        /// Owning stream class.
        stream: StreamClassId,
        /// Event class identifier.
        event: EventClassId,
        /// Event class name.
        name: String,
    },
}

impl fmt::Display for ClassLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => f.write_str("trace class"),
            Self::Stream(id) => write!(f, "{id}"),
            Self::Event {
                stream,
                event,
                name,
            } => write!(f, "{event} `{name}` of {stream}"),
        }
    }
}

/// The field carrying a failed reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    /// Position of the variant or sequence.
    pub referrer: FieldPath,
    /// Tag or length.
    pub kind: ReferenceKind,
    /// The reference as written.
    pub reference: String,
}

impl fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reference `{}` of the field at {}",
            self.kind, self.reference, self.referrer
        )
    }
}

/// A failed resolution pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot resolve {location}{}: {kind}", site_suffix(.site))]
pub struct ResolveError {
    /// The class being resolved.
    pub location: ClassLocation,
    /// The failing reference, when the error concerns one.
    pub site: Option<ReferenceSite>,
    /// What went wrong.
    pub kind: ResolveErrorKind,
}

impl ResolveError {
    /// An error not tied to a particular reference.
    pub fn new(location: ClassLocation, kind: impl Into<ResolveErrorKind>) -> Self {
        Self {
            location,
            site: None,
            kind: kind.into(),
        }
    }

    /// An error raised while resolving the reference at `site`.
    pub fn at(location: ClassLocation, site: ReferenceSite, kind: ResolveErrorKind) -> Self {
        Self {
            location,
            site: Some(site),
            kind,
        }
    }

    /// What went wrong.
    pub fn kind(&self) -> &ResolveErrorKind {
        &self.kind
    }
}

fn site_suffix(site: &Option<ReferenceSite>) -> String {
    site.as_ref()
        .map(|s| format!(", {s}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdl_core::FieldIndex;

    #[test]
    fn display_names_field_scope_and_reference() {
        let err = ResolveError::at(
            ClassLocation::Event {
                stream: StreamClassId(0),
                event: EventClassId(2),
                name: "irq".into(),
            },
            ReferenceSite {
                referrer: FieldPath::new(Scope::EventPayload, vec![FieldIndex::Member(1)]),
                kind: ReferenceKind::SequenceLength,
                reference: "count".into(),
            },
            ResolveErrorKind::UnresolvedPath {
                path: "count".into(),
                scope: Scope::EventPayload,
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("event-class:2 `irq` of stream-class:0"), "{msg}");
        assert!(msg.contains("sequence length reference `count`"), "{msg}");
        assert!(msg.contains("event-payload[1]"), "{msg}");
    }

    #[test]
    fn display_without_site() {
        let err = ResolveError::new(
            ClassLocation::Trace,
            ResolveErrorKind::NestingTooDeep { limit: 4 },
        );
        assert_eq!(
            err.to_string(),
            "cannot resolve trace class: field classes nest deeper than 4 levels"
        );
    }
}
