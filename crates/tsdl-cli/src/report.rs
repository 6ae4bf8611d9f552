//! Listing of the references held by a trace class.

use std::fmt;

use serde::Serialize;
use tsdl_core::{FieldClass, FieldIndex, FieldPath, Scope, TraceClass};
use tsdl_resolve::{ClassLocation, ReferenceKind};

/// One variant tag or sequence length reference and its resolved target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry {
    /// The class declaring the referrer.
    pub class: String,
    /// Position of the variant or sequence.
    pub referrer: FieldPath,
    /// `variant tag` or `sequence length`.
    pub kind: String,
    /// The reference as written.
    pub reference: String,
    /// The resolved target, if any.
    pub target: Option<FieldPath>,
}

impl fmt::Display for ReferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} `{}` -> ",
            self.class, self.referrer, self.kind, self.reference
        )?;
        match &self.target {
            Some(target) => write!(f, "{target}"),
            None => f.write_str("unresolved"),
        }
    }
}

/// Every reference in `tc`, in record order.
pub fn references(tc: &TraceClass) -> Vec<ReferenceEntry> {
    let mut out = Vec::new();
    let mut visit = |location: &ClassLocation, scope: Scope, root: Option<&FieldClass>| {
        if let Some(root) = root {
            collect(root, &location.to_string(), scope, &mut Vec::new(), &mut out);
        }
    };

    visit(&ClassLocation::Trace, Scope::PacketHeader, tc.packet_header.as_ref());
    for sc in &tc.stream_classes {
        let location = ClassLocation::Stream(sc.id);
        for scope in [Scope::PacketContext, Scope::EventHeader, Scope::EventCommonContext] {
            visit(&location, scope, sc.scope_root(scope));
        }
        for ec in &sc.event_classes {
            let location = ClassLocation::Event {
                stream: sc.id,
                event: ec.id,
                name: ec.name.clone(),
            };
            for scope in [Scope::EventSpecificContext, Scope::EventPayload] {
                visit(&location, scope, ec.scope_root(scope));
            }
        }
    }
    out
}

fn collect(
    fc: &FieldClass,
    class: &str,
    scope: Scope,
    path: &mut Vec<FieldIndex>,
    out: &mut Vec<ReferenceEntry>,
) {
    let entry = |kind: ReferenceKind, reference: &str, target: &Option<FieldPath>| ReferenceEntry {
        class: class.to_owned(),
        referrer: FieldPath::new(scope, path.clone()),
        kind: kind.to_string(),
        reference: reference.to_owned(),
        target: target.clone(),
    };
    match fc {
        FieldClass::Variant(v) => out.push(entry(ReferenceKind::VariantTag, &v.tag_ref, &v.tag_path)),
        FieldClass::Sequence(s) => {
            out.push(entry(ReferenceKind::SequenceLength, &s.length_ref, &s.length_path))
        }
        _ => {}
    }

    for i in 0..fc.child_count() {
        let index = if fc.is_array_like() {
            FieldIndex::Element
        } else {
            FieldIndex::Member(i)
        };
        if let Some(child) = fc.child(index) {
            path.push(index);
            collect(child, class, scope, path, out);
            path.pop();
        }
    }
}
