//! # Scopes: The Six Structural Regions of a Record
//!
//! Defines the `Scope` enum. Every field of a trace record lives in exactly
//! one scope, and the declaration order of the variants is the order in
//! which scopes appear in the linearized record. `Ord` on `Scope` is
//! therefore meaningful: a field in an earlier scope is always decoded
//! before any field of a later scope.
//!
//! ## Absolute References
//!
//! A dotted reference that starts with one of the prefixes below names a
//! field from the root of that scope. Anything else is relative to the
//! referring field.
//!
//! | Scope | Prefix | Tokens |
//! |-------|--------|--------|
//! | `PacketHeader` | `trace.packet.header.` | 3 |
//! | `PacketContext` | `stream.packet.context.` | 3 |
//! | `EventHeader` | `stream.event.header.` | 3 |
//! | `EventCommonContext` | `stream.event.context.` | 3 |
//! | `EventSpecificContext` | `event.context.` | 2 |
//! | `EventPayload` | `event.fields.` | 2 |

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six fixed scopes of a trace record, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Trace packet header.
    PacketHeader,
    /// Stream packet context.
    PacketContext,
    /// Stream event header.
    EventHeader,
    /// Stream event common context.
    EventCommonContext,
    /// Event specific context.
    EventSpecificContext,
    /// Event payload.
    EventPayload,
}

/// Number of scopes. Used to size per-scope tables.
pub const SCOPE_COUNT: usize = 6;

/// The class that declares (and owns) the root of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeOwner {
    /// The trace class.
    Trace,
    /// A stream class.
    Stream,
    /// An event class.
    Event,
}

impl Scope {
    /// Returns all scopes in record order.
    pub fn all() -> &'static [Scope; SCOPE_COUNT] {
        &[
            Self::PacketHeader,
            Self::PacketContext,
            Self::EventHeader,
            Self::EventCommonContext,
            Self::EventSpecificContext,
            Self::EventPayload,
        ]
    }

    /// Position of this scope in record order, `0..SCOPE_COUNT`.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// The kebab-case identifier, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PacketHeader => "packet-header",
            Self::PacketContext => "packet-context",
            Self::EventHeader => "event-header",
            Self::EventCommonContext => "event-common-context",
            Self::EventSpecificContext => "event-specific-context",
            Self::EventPayload => "event-payload",
        }
    }

    /// The textual prefix of an absolute reference into this scope,
    /// including the trailing dot.
    pub fn absolute_prefix(self) -> &'static str {
        match self {
            Self::PacketHeader => "trace.packet.header.",
            Self::PacketContext => "stream.packet.context.",
            Self::EventHeader => "stream.event.header.",
            Self::EventCommonContext => "stream.event.context.",
            Self::EventSpecificContext => "event.context.",
            Self::EventPayload => "event.fields.",
        }
    }

    /// Number of path tokens taken by [`Scope::absolute_prefix`].
    pub fn prefix_token_count(self) -> usize {
        match self {
            Self::PacketHeader
            | Self::PacketContext
            | Self::EventHeader
            | Self::EventCommonContext => 3,
            Self::EventSpecificContext | Self::EventPayload => 2,
        }
    }

    /// Returns the scope whose absolute prefix starts `path`, trying scopes
    /// in record order. `None` means the path is relative.
    pub fn from_absolute_path(path: &str) -> Option<Scope> {
        Self::all()
            .iter()
            .copied()
            .find(|scope| path.starts_with(scope.absolute_prefix()))
    }

    /// The class kind that declares this scope's root.
    pub fn owner(self) -> ScopeOwner {
        match self {
            Self::PacketHeader => ScopeOwner::Trace,
            Self::PacketContext | Self::EventHeader | Self::EventCommonContext => {
                ScopeOwner::Stream
            }
            Self::EventSpecificContext | Self::EventPayload => ScopeOwner::Event,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ScopeOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => f.write_str("trace class"),
            Self::Stream => f.write_str("stream class"),
            Self::Event => f.write_str("event class"),
        }
    }
}
