//! Marks byte arrays and sequences holding UTF-8 text.
//!
//! An array or sequence is text when its element is an integer (or an
//! enumeration over one) of exactly 8 bits, 8-bit aligned, with UTF-8
//! encoding. Its element integer is then forced unsigned.

use tsdl_core::{Encoding, FieldClass, IntFieldClass, TraceClass};

fn is_text_element(elem: &FieldClass) -> bool {
    elem.as_int().is_some_and(|int| {
        int.size == 8 && int.alignment == 8 && int.encoding == Encoding::Utf8
    })
}

fn int_mut(fc: &mut FieldClass) -> Option<&mut IntFieldClass> {
    match fc {
        FieldClass::Int(i) => Some(i),
        FieldClass::Enum(e) => Some(&mut e.int),
        _ => None,
    }
}

/// Mark text arrays and sequences under `fc`. Returns how many were marked.
pub fn update_field_class(fc: &mut FieldClass) -> usize {
    match fc {
        FieldClass::Struct(s) => s.members.iter_mut().map(|m| update_field_class(&mut m.fc)).sum(),
        FieldClass::Variant(v) => v.options.iter_mut().map(|o| update_field_class(&mut o.fc)).sum(),
        FieldClass::Array(a) => mark(&mut a.elem, &mut a.is_text),
        FieldClass::Sequence(s) => mark(&mut s.elem, &mut s.is_text),
        _ => 0,
    }
}

fn mark(elem: &mut FieldClass, is_text: &mut bool) -> usize {
    if is_text_element(elem) {
        *is_text = true;
        if let Some(int) = int_mut(elem) {
            int.is_signed = false;
        }
        1
    } else {
        update_field_class(elem)
    }
}

/// Mark text arrays and sequences in every non-finalized scope of `tc`.
pub fn update_text_arrays(tc: &mut TraceClass) -> usize {
    let mut marked = 0;
    if !tc.is_finalized {
        marked += tc.packet_header.as_mut().map_or(0, update_field_class);
    }
    for sc in &mut tc.stream_classes {
        if !sc.is_finalized {
            for root in [
                &mut sc.packet_context,
                &mut sc.event_header,
                &mut sc.event_common_context,
            ] {
                marked += root.as_mut().map_or(0, update_field_class);
            }
        }
        for ec in sc.event_classes.iter_mut().filter(|ec| !ec.is_finalized) {
            for root in [&mut ec.specific_context, &mut ec.payload] {
                marked += root.as_mut().map_or(0, update_field_class);
            }
        }
    }
    tracing::debug!(marked, "text arrays and sequences marked");
    marked
}
