//! # Target Validation
//!
//! A resolved target is only usable if a decoder reading the record front
//! to back has already decoded it when it reaches the referrer, and if it
//! has the kind the referrer needs. Checks run in this order:
//!
//! 1. The target is not a scope root.
//! 2. The target's scope is not after the referrer's scope.
//! 3. Within one scope, at the lowest common ancestor of both paths, the
//!    target index is strictly smaller than the referrer index. Paths
//!    where one contains the other have no such ancestor and are refused.
//! 4. A variant tag is an enumeration. A sequence length is an unsigned
//!    integer, or an enumeration over one.

use tsdl_core::{FieldClass, FieldPath};

use crate::error::{ForwardReason, ReferenceKind, ResolveErrorKind};

impl ReferenceKind {
    /// The kind of reference `fc` carries, if any.
    pub fn of(fc: &FieldClass) -> Option<Self> {
        match fc {
            FieldClass::Variant(_) => Some(Self::VariantTag),
            FieldClass::Sequence(_) => Some(Self::SequenceLength),
            _ => None,
        }
    }

    /// Kind name a target must have, for diagnostics.
    pub fn expected_kind(self) -> &'static str {
        match self {
            Self::VariantTag => "enumeration",
            Self::SequenceLength => "unsigned integer",
        }
    }

    fn accepts(self, target: &FieldClass) -> bool {
        match self {
            Self::VariantTag => matches!(target, FieldClass::Enum(_)),
            Self::SequenceLength => target.as_int().is_some_and(|int| !int.is_signed),
        }
    }
}

/// First depth at which `a` and `b` differ, or `None` when one path's
/// indices are a prefix of the other's.
pub fn lca_index(a: &FieldPath, b: &FieldPath) -> Option<usize> {
    a.indices()
        .iter()
        .zip(b.indices())
        .position(|(x, y)| x != y)
}

/// Check that `target` can serve as the `kind` reference of the field at
/// `referrer`.
///
/// # Errors
///
/// - [`ResolveErrorKind::SelfReference`] if the target is a scope root.
/// - [`ResolveErrorKind::ForwardReference`] if the target does not precede
///   the referrer.
/// - [`ResolveErrorKind::TypeMismatch`] if the target has the wrong kind.
pub fn validate_target(
    target: &FieldPath,
    target_fc: &FieldClass,
    kind: ReferenceKind,
    referrer: &FieldPath,
) -> Result<(), ResolveErrorKind> {
    if target.is_empty() {
        return Err(ResolveErrorKind::SelfReference(target.root()));
    }

    let forward = |reason| ResolveErrorKind::ForwardReference {
        target: target.clone(),
        referrer: referrer.clone(),
        reason,
    };
    if target.root() > referrer.root() {
        return Err(forward(ForwardReason::LaterScope));
    }
    if target.root() == referrer.root() {
        let depth = lca_index(target, referrer).ok_or_else(|| forward(ForwardReason::Nested))?;
        // Both paths are longer than `depth` by construction of `lca_index`.
        if let (Some(t), Some(r)) = (target.get(depth), referrer.get(depth)) {
            if t >= r {
                return Err(forward(ForwardReason::LaterIndex {
                    depth,
                    target: t.as_i64(),
                    referrer: r.as_i64(),
                }));
            }
        }
    }

    if !kind.accepts(target_fc) {
        return Err(ResolveErrorKind::TypeMismatch {
            target: target.clone(),
            expected: kind.expected_kind(),
            found: target_fc.kind_name(),
        });
    }
    Ok(())
}
