//! # Path Resolver: Reference String to Field Path
//!
//! Turns the dotted reference carried by a variant or a sequence into a
//! [`FieldPath`] and the field class it designates.
//!
//! ## Absolute References
//!
//! A reference starting with a scope prefix (see [`ScopeTable::classify`])
//! descends from that scope's root after the prefix tokens. The scope must
//! be available.
//!
//! ## Relative References
//!
//! Any other reference is looked up from the innermost ancestor outwards.
//! At each frame the tokens are followed from the frame's field class; the
//! first frame where they lead somewhere wins, and the result is the
//! indices of the outer frames followed by the indices of the descent.
//!
//! ## Descent Rules
//!
//! - Array and sequence elements are transparent: entering one pushes
//!   [`FieldIndex::Element`] without consuming a token.
//! - Structure members and variant options are matched on their original
//!   name and consume one token.
//! - At a frame, the first name matched must not come after the child that
//!   frame is currently visiting. Deeper names are unconstrained; ordering
//!   is checked afterwards by [`crate::validate`]. When no frame matches
//!   and some frame only failed on this rule, the innermost such failure is
//!   reported as a forward reference.
//! - Tokens left over at a scalar fail the descent.

use std::fmt;

use tsdl_core::{FieldClass, FieldIndex, FieldPath};

use crate::error::{ForwardReason, ResolveErrorKind};
use crate::path::tokenize;
use crate::scope_table::ScopeTable;
use crate::stack::TraversalStack;

/// A resolved reference.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Structural path to the target.
    pub path: FieldPath,
    /// The target field class.
    pub target: &'a FieldClass,
}

/// Why a descent from one frame failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Miss<'p> {
    NoSuchField(&'p str),
    AfterCurrent { token: &'p str, index: FieldIndex },
}

impl fmt::Display for Miss<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchField(token) => write!(f, "no field `{token}`"),
            Self::AfterCurrent { token, index } => {
                write!(f, "`{token}` at index {index} comes after the current child")
            }
        }
    }
}

/// Resolve `reference` from the current position.
///
/// # Errors
///
/// - [`ResolveErrorKind::PathSyntax`] for an empty token.
/// - [`ResolveErrorKind::ScopeUnavailable`] when an absolute reference
///   names an unusable scope.
/// - [`ResolveErrorKind::UnresolvedPath`] when no field matches.
pub fn resolve<'a>(
    reference: &str,
    stack: &TraversalStack<'a>,
    table: &ScopeTable<'a>,
) -> Result<Resolution<'a>, ResolveErrorKind> {
    let tokens = tokenize(reference)?;
    let path = match ScopeTable::classify(reference) {
        Some(scope) => {
            let root = table.check_available(scope)?;
            let tail = tokens.get(scope.prefix_token_count()..).unwrap_or_default();
            let mut indices = Vec::new();
            descend(tail, root, None, &mut indices).map_err(|miss| {
                tracing::debug!(reference, %scope, %miss, "absolute reference does not resolve");
                ResolveErrorKind::UnresolvedPath {
                    path: reference.to_owned(),
                    scope,
                }
            })?;
            FieldPath::new(scope, indices)
        }
        None => resolve_relative(reference, &tokens, stack, table)?,
    };

    let target = table
        .roots()
        .field_class(&path)
        .ok_or_else(|| ResolveErrorKind::UnresolvedPath {
            path: reference.to_owned(),
            scope: path.root(),
        })?;
    tracing::debug!(reference, %path, kind = target.kind_name(), "reference resolved");
    Ok(Resolution { path, target })
}

fn resolve_relative<'a>(
    reference: &str,
    tokens: &[&str],
    stack: &TraversalStack<'a>,
    table: &ScopeTable<'a>,
) -> Result<FieldPath, ResolveErrorKind> {
    let scope = table.active();
    let mut later = None;
    for (depth, frame) in stack.frames().iter().enumerate().rev() {
        let mut tail = Vec::new();
        match descend(tokens, frame.fc, frame.index, &mut tail) {
            Ok(()) => {
                let mut indices = stack.indices_below(depth);
                indices.extend(tail);
                return Ok(FieldPath::new(scope, indices));
            }
            Err(miss) => {
                tracing::trace!(reference, depth, %miss, "relative lookup missed at frame");
                if let (Miss::AfterCurrent { index, .. }, Some(current)) = (miss, frame.index) {
                    if later.is_none() {
                        let mut target = stack.indices_below(depth);
                        target.push(index);
                        later = Some(ResolveErrorKind::ForwardReference {
                            target: FieldPath::new(scope, target),
                            referrer: stack.field_path(scope),
                            reason: ForwardReason::LaterIndex {
                                depth,
                                target: index.as_i64(),
                                referrer: current.as_i64(),
                            },
                        });
                    }
                }
            }
        }
    }
    // A name that only exists after the current child is a forward reference.
    Err(later.unwrap_or_else(|| ResolveErrorKind::UnresolvedPath {
        path: reference.to_owned(),
        scope,
    }))
}

/// Follow `tokens` from `fc`, pushing each index onto `out`.
///
/// `bound` limits the first name matched; `None` means unbounded.
fn descend<'p>(
    tokens: &[&'p str],
    mut fc: &FieldClass,
    bound: Option<FieldIndex>,
    out: &mut Vec<FieldIndex>,
) -> Result<(), Miss<'p>> {
    let mut rest = tokens;
    let mut first_lookup = true;
    while let Some((&token, tail)) = rest.split_first() {
        let index = if fc.is_array_like() {
            FieldIndex::Element
        } else {
            let index = fc.index_of(token).ok_or(Miss::NoSuchField(token))?;
            if first_lookup && bound.is_some_and(|current| index > current) {
                return Err(Miss::AfterCurrent { token, index });
            }
            first_lookup = false;
            rest = tail;
            index
        };
        out.push(index);
        fc = fc.child(index).ok_or(Miss::NoSuchField(token))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScopeUnavailableReason;
    use tsdl_core::{
        ArrayFieldClass, EventClass, IntFieldClass, Scope, SequenceFieldClass, StreamClass,
        StructFieldClass,
    };

    fn u8c() -> FieldClass {
        IntFieldClass::unsigned(8).into()
    }

    fn payload() -> FieldClass {
        // { len: u8, hdr: { n: u8 }, pts: [ { x: u8, y: u8 } ; 2 ], data: seq }
        let hdr = StructFieldClass::from_members([("n", u8c())]).unwrap();
        let pt = StructFieldClass::from_members([("x", u8c()), ("y", u8c())]).unwrap();
        StructFieldClass::from_members([
            ("len", u8c()),
            ("hdr", hdr.into()),
            ("pts", ArrayFieldClass::new(pt.into(), 2).into()),
            ("data", SequenceFieldClass::new(u8c(), "len").into()),
        ])
        .unwrap()
        .into()
    }

    fn at_member<'a>(stack: &mut TraversalStack<'a>, fc: &'a FieldClass, i: usize) {
        stack.push(fc);
        stack.set_current_index(FieldIndex::Member(i));
    }

    fn table_for(ec: &EventClass) -> ScopeTable<'_> {
        let mut table = ScopeTable::new();
        table.install_event(ec);
        table.set_active(Scope::EventPayload);
        table
    }

    #[test]
    fn relative_sibling() {
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let table = table_for(&ec);
        let root = ec.payload.as_ref().unwrap();
        let mut stack = TraversalStack::new();
        at_member(&mut stack, root, 3);

        let r = resolve("len", &stack, &table).unwrap();
        assert_eq!(
            r.path,
            FieldPath::new(Scope::EventPayload, vec![FieldIndex::Member(0)])
        );
        assert_eq!(r.target.kind_name(), "unsigned integer");

        let r = resolve("hdr.n", &stack, &table).unwrap();
        assert_eq!(r.path.indices(), &[FieldIndex::Member(1), FieldIndex::Member(0)]);
    }

    #[test]
    fn array_is_transparent() {
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let table = table_for(&ec);
        let root = ec.payload.as_ref().unwrap();
        let mut stack = TraversalStack::new();
        at_member(&mut stack, root, 3);

        let r = resolve("pts.y", &stack, &table).unwrap();
        assert_eq!(
            r.path.indices(),
            &[FieldIndex::Member(2), FieldIndex::Element, FieldIndex::Member(1)]
        );
    }

    #[test]
    fn later_sibling_is_forward_reference() {
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let table = table_for(&ec);
        let root = ec.payload.as_ref().unwrap();
        let mut stack = TraversalStack::new();
        at_member(&mut stack, root, 0);

        let err = resolve("data", &stack, &table).unwrap_err();
        assert_eq!(
            err,
            ResolveErrorKind::ForwardReference {
                target: FieldPath::new(Scope::EventPayload, vec![FieldIndex::Member(3)]),
                referrer: FieldPath::new(Scope::EventPayload, vec![FieldIndex::Member(0)]),
                reason: ForwardReason::LaterIndex {
                    depth: 0,
                    target: 3,
                    referrer: 0
                },
            }
        );

        assert_eq!(
            resolve("nope", &stack, &table).unwrap_err(),
            ResolveErrorKind::UnresolvedPath {
                path: "nope".into(),
                scope: Scope::EventPayload
            }
        );
    }

    #[test]
    fn falls_back_to_outer_frame() {
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let table = table_for(&ec);
        let root = ec.payload.as_ref().unwrap();
        let hdr = root.child(FieldIndex::Member(1)).unwrap();
        let mut stack = TraversalStack::new();
        at_member(&mut stack, root, 1);
        at_member(&mut stack, hdr, 0);

        let r = resolve("len", &stack, &table).unwrap();
        assert_eq!(r.path.indices(), &[FieldIndex::Member(0)]);
    }

    #[test]
    fn scalar_with_tokens_left_fails() {
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let table = table_for(&ec);
        let root = ec.payload.as_ref().unwrap();
        let mut stack = TraversalStack::new();
        at_member(&mut stack, root, 3);
        assert!(matches!(
            resolve("len.x", &stack, &table),
            Err(ResolveErrorKind::UnresolvedPath { .. })
        ));
    }

    #[test]
    fn absolute_into_stream_scope() {
        let mut sc = StreamClass::new(0);
        sc.packet_context =
            Some(StructFieldClass::from_members([("size", u8c()), ("flags", u8c())]).unwrap().into());
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let mut table = table_for(&ec);
        table.install_stream(&sc);
        let stack = TraversalStack::new();

        let r = resolve("stream.packet.context.flags", &stack, &table).unwrap();
        assert_eq!(
            r.path,
            FieldPath::new(Scope::PacketContext, vec![FieldIndex::Member(1)])
        );
    }

    #[test]
    fn absolute_into_absent_owner() {
        let mut ec = EventClass::new(0, "e");
        ec.payload = Some(payload());
        let table = table_for(&ec);
        let stack = TraversalStack::new();
        assert_eq!(
            resolve("trace.packet.header.magic", &stack, &table).unwrap_err(),
            ResolveErrorKind::ScopeUnavailable {
                scope: Scope::PacketHeader,
                reason: ScopeUnavailableReason::NoOwner(tsdl_core::ScopeOwner::Trace),
            }
        );
    }

    #[test]
    fn malformed_reference() {
        let table = ScopeTable::new();
        let stack = TraversalStack::new();
        for reference in ["", "a..b", ".a", "a."] {
            assert!(matches!(
                resolve(reference, &stack, &table),
                Err(ResolveErrorKind::PathSyntax(_))
            ));
        }
    }
}
