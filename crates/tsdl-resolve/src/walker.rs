//! # Resolution Walker: Whole-Schema Pass
//!
//! Visits every field class of every non-finalized scope in record order
//! and resolves each variant tag and sequence length reference it meets.
//!
//! ## Design
//!
//! The pass runs in two phases. The walk borrows the trace class
//! immutably, keeps the ancestors of the current field on a
//! [`TraversalStack`], and records each validated target as a pending
//! resolution keyed by the referrer's own path. Only when every reference
//! of the pass has been validated are the pending paths written into the
//! tree. A failed pass therefore leaves the trace class exactly as it was.
//!
//! ## Order
//!
//! 1. Packet header, unless the trace class is finalized.
//! 2. For each stream class: its packet context, event header and event
//!    common context unless it is finalized, then each non-finalized event
//!    class's specific context and payload.
//!
//! A finalized stream class still installs its scopes so that its event
//! classes can refer into them relatively, but absolute references into a
//! finalized class's scopes are refused (see [`ScopeTable::check_available`]).

use serde::Serialize;
use tsdl_core::{
    EventClass, EventClassId, FieldClass, FieldIndex, FieldPath, Scope, ScopeOwner,
    StreamClassId, TraceClass,
};

use crate::config::ResolveConfig;
use crate::error::{
    ClassLocation, ReferenceKind, ReferenceSite, ResolveError, ResolveErrorKind,
    ScopeUnavailableReason,
};
use crate::resolver;
use crate::scope_table::ScopeTable;
use crate::stack::TraversalStack;
use crate::validate::validate_target;

/// Counts of references written by one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    /// Variant tag paths written.
    pub variant_tags: usize,
    /// Sequence length paths written.
    pub sequence_lengths: usize,
}

/// Resolves variant tag and sequence length references in place.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolveConfig,
}

impl Resolver {
    /// A resolver using `config`.
    pub fn new(config: ResolveConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Resolve every non-finalized scope of `tc`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolveError`] met. `tc` is then unchanged.
    pub fn resolve_trace_class(&self, tc: &mut TraceClass) -> Result<ResolveSummary, ResolveError> {
        let pending = self.collect_trace(tc)?;
        let summary = commit(tc, pending);
        tracing::info!(
            variant_tags = summary.variant_tags,
            sequence_lengths = summary.sequence_lengths,
            "trace class resolved"
        );
        Ok(summary)
    }

    /// Resolve the two scopes of one event class, as done when an event
    /// class is added after its stream class was already resolved.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveErrorKind::Schema`] if the classes do not exist,
    /// [`ResolveErrorKind::ScopeUnavailable`] if the event class is
    /// finalized, or the first reference error. `tc` is then unchanged.
    pub fn resolve_event_class(
        &self,
        tc: &mut TraceClass,
        stream: StreamClassId,
        event: EventClassId,
    ) -> Result<ResolveSummary, ResolveError> {
        let pending = self.collect_event(tc, stream, event)?;
        let summary = commit(tc, pending);
        tracing::info!(
            %stream,
            %event,
            variant_tags = summary.variant_tags,
            sequence_lengths = summary.sequence_lengths,
            "event class resolved"
        );
        Ok(summary)
    }

    fn collect_trace(&self, tc: &TraceClass) -> Result<Vec<Pending>, ResolveError> {
        let mut walk = Walk::new(&self.config);
        walk.table.install_trace(tc);
        if tc.is_finalized {
            tracing::debug!("trace class finalized, packet header skipped");
        } else {
            walk.enter(ClassLocation::Trace, Owner::Trace);
            walk.resolve_scope(Scope::PacketHeader)?;
        }

        for (si, sc) in tc.stream_classes.iter().enumerate() {
            walk.table.install_stream(sc);
            if sc.is_finalized {
                tracing::debug!(stream = %sc.id, "stream class finalized, its scopes skipped");
            } else {
                walk.enter(ClassLocation::Stream(sc.id), Owner::Stream(si));
                for scope in [Scope::PacketContext, Scope::EventHeader, Scope::EventCommonContext] {
                    walk.resolve_scope(scope)?;
                }
            }
            for (ei, ec) in sc.event_classes.iter().enumerate() {
                if ec.is_finalized {
                    continue;
                }
                walk.resolve_event(sc.id, ec, Owner::Event(si, ei))?;
            }
            walk.table.clear_stream();
        }
        Ok(walk.pending)
    }

    fn collect_event(
        &self,
        tc: &TraceClass,
        stream: StreamClassId,
        event: EventClassId,
    ) -> Result<Vec<Pending>, ResolveError> {
        let (si, ei) = tc
            .event_class_position(stream, event)
            .map_err(|e| ResolveError::new(ClassLocation::Stream(stream), e))?;
        let sc = &tc.stream_classes[si];
        let ec = &sc.event_classes[ei];
        if ec.is_finalized {
            return Err(ResolveError::new(
                event_location(stream, ec),
                ResolveErrorKind::ScopeUnavailable {
                    scope: Scope::EventSpecificContext,
                    reason: ScopeUnavailableReason::Finalized(ScopeOwner::Event),
                },
            ));
        }

        let mut walk = Walk::new(&self.config);
        walk.table.install_trace(tc);
        walk.table.install_stream(sc);
        walk.resolve_event(stream, ec, Owner::Event(si, ei))?;
        Ok(walk.pending)
    }
}

fn event_location(stream: StreamClassId, ec: &EventClass) -> ClassLocation {
    ClassLocation::Event {
        stream,
        event: ec.id,
        name: ec.name.clone(),
    }
}

/// Positions of the class owning a referrer, for the commit phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Trace,
    Stream(usize),
    Event(usize, usize),
}

/// A validated reference not yet written into the tree.
#[derive(Debug)]
struct Pending {
    owner: Owner,
    referrer: FieldPath,
    kind: ReferenceKind,
    target: FieldPath,
}

struct Walk<'a, 'c> {
    config: &'c ResolveConfig,
    table: ScopeTable<'a>,
    stack: TraversalStack<'a>,
    location: ClassLocation,
    owner: Owner,
    pending: Vec<Pending>,
}

impl<'a, 'c> Walk<'a, 'c> {
    fn new(config: &'c ResolveConfig) -> Self {
        Self {
            config,
            table: ScopeTable::new(),
            stack: TraversalStack::new(),
            location: ClassLocation::Trace,
            owner: Owner::Trace,
            pending: Vec::new(),
        }
    }

    fn enter(&mut self, location: ClassLocation, owner: Owner) {
        self.location = location;
        self.owner = owner;
    }

    fn resolve_event(
        &mut self,
        stream: StreamClassId,
        ec: &'a EventClass,
        owner: Owner,
    ) -> Result<(), ResolveError> {
        self.table.install_event(ec);
        self.enter(event_location(stream, ec), owner);
        for scope in [Scope::EventSpecificContext, Scope::EventPayload] {
            self.resolve_scope(scope)?;
        }
        self.table.clear_event();
        Ok(())
    }

    fn resolve_scope(&mut self, scope: Scope) -> Result<(), ResolveError> {
        let Some(root) = self.table.root_class_for(scope) else {
            return Ok(());
        };
        let _span = tracing::debug_span!("resolve_scope", %scope, class = %self.location).entered();
        self.table.set_active(scope);
        self.visit(root, 0)?;
        debug_assert!(self.stack.is_empty());
        Ok(())
    }

    fn visit(&mut self, fc: &'a FieldClass, depth: usize) -> Result<(), ResolveError> {
        if depth > self.config.max_depth {
            return Err(ResolveError::new(
                self.location.clone(),
                ResolveErrorKind::NestingTooDeep {
                    limit: self.config.max_depth,
                },
            ));
        }

        match fc {
            FieldClass::Variant(v) => self.resolve_reference(&v.tag_ref, ReferenceKind::VariantTag)?,
            FieldClass::Sequence(s) => {
                self.resolve_reference(&s.length_ref, ReferenceKind::SequenceLength)?
            }
            _ => {}
        }

        if fc.is_compound() {
            self.stack.push(fc);
            for i in 0..fc.child_count() {
                let index = if fc.is_array_like() {
                    FieldIndex::Element
                } else {
                    FieldIndex::Member(i)
                };
                self.stack.set_current_index(index);
                if let Some(child) = fc.child(index) {
                    self.visit(child, depth + 1)?;
                }
            }
            self.stack.pop();
        }
        Ok(())
    }

    fn resolve_reference(&mut self, reference: &str, kind: ReferenceKind) -> Result<(), ResolveError> {
        let referrer = self.stack.field_path(self.table.active());
        let validated = resolver::resolve(reference, &self.stack, &self.table).and_then(|r| {
            validate_target(&r.path, r.target, kind, &referrer)?;
            Ok(r.path)
        });
        match validated {
            Ok(target) => {
                tracing::debug!(%kind, reference, %referrer, %target, "reference validated");
                self.pending.push(Pending {
                    owner: self.owner,
                    referrer,
                    kind,
                    target,
                });
                Ok(())
            }
            Err(err) => {
                tracing::debug!(%kind, reference, %referrer, error = %err, "reference rejected");
                Err(ResolveError::at(
                    self.location.clone(),
                    ReferenceSite {
                        referrer,
                        kind,
                        reference: reference.to_owned(),
                    },
                    err,
                ))
            }
        }
    }
}

fn commit(tc: &mut TraceClass, pending: Vec<Pending>) -> ResolveSummary {
    let mut summary = ResolveSummary::default();
    for p in pending {
        let scope = p.referrer.root();
        let root = match p.owner {
            Owner::Trace => tc.packet_header.as_mut(),
            Owner::Stream(si) => tc
                .stream_classes
                .get_mut(si)
                .and_then(|sc| sc.scope_root_mut(scope)),
            Owner::Event(si, ei) => tc
                .stream_classes
                .get_mut(si)
                .and_then(|sc| sc.event_classes.get_mut(ei))
                .and_then(|ec| ec.scope_root_mut(scope)),
        };
        match (root.and_then(|r| r.descendant_mut(p.referrer.indices())), p.kind) {
            (Some(FieldClass::Variant(v)), ReferenceKind::VariantTag) => {
                v.tag_path = Some(p.target);
                summary.variant_tags += 1;
            }
            (Some(FieldClass::Sequence(s)), ReferenceKind::SequenceLength) => {
                s.length_path = Some(p.target);
                summary.sequence_lengths += 1;
            }
            _ => debug_assert!(false, "no {} referrer at {}", p.kind, p.referrer),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdl_core::{
        ArrayFieldClass, EnumFieldClass, IntFieldClass, SequenceFieldClass, StreamClass,
        StructFieldClass, VariantFieldClass,
    };

    fn u8c() -> FieldClass {
        IntFieldClass::unsigned(8).into()
    }

    fn nested(depth: usize) -> FieldClass {
        (0..depth).fold(u8c(), |inner, _| {
            StructFieldClass::from_members([("m", inner)]).unwrap().into()
        })
    }

    fn trace_with_payload(payload: FieldClass) -> TraceClass {
        let mut ec = EventClass::new(1, "ev");
        ec.payload = Some(payload);
        let mut sc = StreamClass::new(0);
        sc.event_classes.push(ec);
        TraceClass {
            packet_header: None,
            stream_classes: vec![sc],
            is_finalized: false,
        }
    }

    fn payload_path<'a>(tc: &'a TraceClass, indices: &[FieldIndex]) -> &'a FieldClass {
        tc.stream_classes[0].event_classes[0]
            .payload
            .as_ref()
            .unwrap()
            .descendant(indices)
            .unwrap()
    }

    #[test]
    fn nesting_limit() {
        let resolver = Resolver::new(ResolveConfig {
            max_depth: 3,
            ..ResolveConfig::default()
        });
        let mut tc = trace_with_payload(nested(3));
        resolver.resolve_trace_class(&mut tc).unwrap();

        let mut tc = trace_with_payload(nested(4));
        let err = resolver.resolve_trace_class(&mut tc).unwrap_err();
        assert_eq!(err.kind(), &ResolveErrorKind::NestingTooDeep { limit: 3 });
        assert!(err.site.is_none());
    }

    #[test]
    fn variant_in_array_resolves_through_element() {
        let tag = EnumFieldClass::new(IntFieldClass::unsigned(8)).map("a", 0, 0);
        let var = VariantFieldClass::from_options("tag", [("a", u8c())]).unwrap();
        let elem = StructFieldClass::from_members([
            ("tag", FieldClass::from(tag)),
            ("v", FieldClass::from(var)),
        ])
        .unwrap();
        let payload = StructFieldClass::from_members([(
            "items",
            FieldClass::from(ArrayFieldClass::new(elem.into(), 3)),
        )])
        .unwrap();
        let mut tc = trace_with_payload(payload.into());

        let summary = Resolver::default().resolve_trace_class(&mut tc).unwrap();
        assert_eq!(
            summary,
            ResolveSummary {
                variant_tags: 1,
                sequence_lengths: 0
            }
        );
        let v = payload_path(
            &tc,
            &[FieldIndex::Member(0), FieldIndex::Element, FieldIndex::Member(1)],
        );
        let FieldClass::Variant(v) = v else {
            panic!("expected a variant");
        };
        assert_eq!(
            v.tag_path,
            Some(FieldPath::new(
                Scope::EventPayload,
                vec![FieldIndex::Member(0), FieldIndex::Element, FieldIndex::Member(0)]
            ))
        );
    }

    #[test]
    fn event_pass_requires_known_classes() {
        let mut tc = trace_with_payload(nested(1));
        let err = Resolver::default()
            .resolve_event_class(&mut tc, StreamClassId(0), EventClassId(9))
            .unwrap_err();
        assert!(matches!(err.kind(), ResolveErrorKind::Schema(_)));
    }

    #[test]
    fn sequence_at_scope_root_is_unresolved() {
        let mut tc = trace_with_payload(SequenceFieldClass::new(u8c(), "len").into());
        let err = Resolver::default().resolve_trace_class(&mut tc).unwrap_err();
        assert!(matches!(err.kind(), ResolveErrorKind::UnresolvedPath { .. }));
        assert_eq!(
            err.site.unwrap().referrer,
            FieldPath::root_of(Scope::EventPayload)
        );
    }
}
