//! # Trace, Stream and Event Classes
//!
//! The owners of scope roots. A trace class declares the packet header;
//! each stream class declares the packet context, event header and event
//! common context; each event class declares its specific context and
//! payload. Any scope root may be absent.
//!
//! ## Finalization
//!
//! Once a class has been translated into the public trace model it is
//! marked finalized. Its scopes are frozen: the resolution pass does not
//! enter them again, and absolute references into them are refused.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field_class::FieldClass;
use crate::field_path::FieldPath;
use crate::scope::{Scope, SCOPE_COUNT};

/// Numeric identifier of a stream class, unique within its trace class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamClassId(pub u64);

/// Numeric identifier of an event class, unique within its stream class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventClassId(pub u64);

impl fmt::Display for StreamClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-class:{}", self.0)
    }
}

impl fmt::Display for EventClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-class:{}", self.0)
    }
}

/// An event class: a record type within a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventClass {
    /// Identifier within the stream class.
    pub id: EventClassId,
    /// Event name.
    #[serde(default)]
    pub name: String,
    /// Event specific context root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_context: Option<FieldClass>,
    /// Event payload root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<FieldClass>,
    /// Whether the class was already translated.
    #[serde(default)]
    pub is_finalized: bool,
}

impl EventClass {
    /// An event class with no scopes.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: EventClassId(id),
            name: name.into(),
            specific_context: None,
            payload: None,
            is_finalized: false,
        }
    }

    /// The root of `scope`, if this class declares it.
    pub fn scope_root(&self, scope: Scope) -> Option<&FieldClass> {
        match scope {
            Scope::EventSpecificContext => self.specific_context.as_ref(),
            Scope::EventPayload => self.payload.as_ref(),
            _ => None,
        }
    }

    /// Mutable access to the root of `scope`.
    pub fn scope_root_mut(&mut self, scope: Scope) -> Option<&mut FieldClass> {
        match scope {
            Scope::EventSpecificContext => self.specific_context.as_mut(),
            Scope::EventPayload => self.payload.as_mut(),
            _ => None,
        }
    }
}

/// A stream class: a family of packets sharing headers and contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamClass {
    /// Identifier within the trace class.
    pub id: StreamClassId,
    /// Packet context root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_context: Option<FieldClass>,
    /// Event header root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_header: Option<FieldClass>,
    /// Event common context root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_common_context: Option<FieldClass>,
    /// Event classes in declaration order.
    #[serde(default)]
    pub event_classes: Vec<EventClass>,
    /// Whether the class was already translated.
    #[serde(default)]
    pub is_finalized: bool,
}

impl StreamClass {
    /// A stream class with no scopes and no event classes.
    pub fn new(id: u64) -> Self {
        Self {
            id: StreamClassId(id),
            packet_context: None,
            event_header: None,
            event_common_context: None,
            event_classes: Vec::new(),
            is_finalized: false,
        }
    }

    /// The root of `scope`, if this class declares it.
    pub fn scope_root(&self, scope: Scope) -> Option<&FieldClass> {
        match scope {
            Scope::PacketContext => self.packet_context.as_ref(),
            Scope::EventHeader => self.event_header.as_ref(),
            Scope::EventCommonContext => self.event_common_context.as_ref(),
            _ => None,
        }
    }

    /// Mutable access to the root of `scope`.
    pub fn scope_root_mut(&mut self, scope: Scope) -> Option<&mut FieldClass> {
        match scope {
            Scope::PacketContext => self.packet_context.as_mut(),
            Scope::EventHeader => self.event_header.as_mut(),
            Scope::EventCommonContext => self.event_common_context.as_mut(),
            _ => None,
        }
    }

    /// The event class with identifier `id`.
    pub fn event_class(&self, id: EventClassId) -> Option<&EventClass> {
        self.event_classes.iter().find(|ec| ec.id == id)
    }
}

/// A trace class: the whole schema of one trace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraceClass {
    /// Packet header root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_header: Option<FieldClass>,
    /// Stream classes in declaration order.
    #[serde(default)]
    pub stream_classes: Vec<StreamClass>,
    /// Whether the class was already translated.
    #[serde(default)]
    pub is_finalized: bool,
}

impl TraceClass {
    /// An empty trace class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the stream class `id` in `stream_classes`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownStreamClass`] if there is none.
    pub fn stream_class_position(&self, id: StreamClassId) -> Result<usize, SchemaError> {
        self.stream_classes
            .iter()
            .position(|sc| sc.id == id)
            .ok_or(SchemaError::UnknownStreamClass(id))
    }

    /// Positions of the stream class `stream` and of its event class `event`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownStreamClass`] or
    /// [`SchemaError::UnknownEventClass`] when either is missing.
    pub fn event_class_position(
        &self,
        stream: StreamClassId,
        event: EventClassId,
    ) -> Result<(usize, usize), SchemaError> {
        let si = self.stream_class_position(stream)?;
        let ei = self.stream_classes[si]
            .event_classes
            .iter()
            .position(|ec| ec.id == event)
            .ok_or(SchemaError::UnknownEventClass { stream, event })?;
        Ok((si, ei))
    }

    /// The six scope roots visible from the given stream and event class.
    pub fn scope_roots<'a>(
        &'a self,
        stream: Option<&'a StreamClass>,
        event: Option<&'a EventClass>,
    ) -> ScopeRoots<'a> {
        let mut roots = ScopeRoots::default();
        roots.set(Scope::PacketHeader, self.packet_header.as_ref());
        if let Some(sc) = stream {
            for scope in [Scope::PacketContext, Scope::EventHeader, Scope::EventCommonContext] {
                roots.set(scope, sc.scope_root(scope));
            }
        }
        if let Some(ec) = event {
            for scope in [Scope::EventSpecificContext, Scope::EventPayload] {
                roots.set(scope, ec.scope_root(scope));
            }
        }
        roots
    }

    /// Check member name uniqueness in every scope root.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError::DuplicateMember`] found.
    pub fn check_unique_names(&self) -> Result<(), SchemaError> {
        let stream_roots = self.stream_classes.iter().flat_map(|sc| {
            [&sc.packet_context, &sc.event_header, &sc.event_common_context]
                .into_iter()
                .chain(
                    sc.event_classes
                        .iter()
                        .flat_map(|ec| [&ec.specific_context, &ec.payload]),
                )
        });
        std::iter::once(&self.packet_header)
            .chain(stream_roots)
            .flatten()
            .try_for_each(FieldClass::check_unique_names)
    }

    /// Mark the trace class and every stream and event class as finalized.
    pub fn mark_finalized(&mut self) {
        self.is_finalized = true;
        for sc in &mut self.stream_classes {
            sc.is_finalized = true;
            for ec in &mut sc.event_classes {
                ec.is_finalized = true;
            }
        }
    }
}

/// Borrowed roots of the six scopes, as seen from one event class.
///
/// This is how a resolved [`FieldPath`] becomes a field class again: the
/// path's root scope selects a root, and its indices are followed from
/// there. The lookup is valid for as long as the borrowed tree is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeRoots<'a> {
    roots: [Option<&'a FieldClass>; SCOPE_COUNT],
}

impl<'a> ScopeRoots<'a> {
    /// Install `root` for `scope`.
    pub fn set(&mut self, scope: Scope, root: Option<&'a FieldClass>) {
        self.roots[scope.ordinal()] = root;
    }

    /// The root of `scope`, if present.
    pub fn get(&self, scope: Scope) -> Option<&'a FieldClass> {
        self.roots[scope.ordinal()]
    }

    /// The field class at `path`, or `None` if the scope is absent or the
    /// path does not exist in it.
    pub fn field_class(&self, path: &FieldPath) -> Option<&'a FieldClass> {
        self.get(path.root())?.descendant(path.indices())
    }
}
