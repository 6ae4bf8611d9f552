//! # Field Classes: The Schema Node Sum Type
//!
//! `FieldClass` is a closed sum type over every kind of field a TSDL
//! schema can declare. Compound classes own their children exclusively:
//! a structure owns its members, a variant its options, an array or a
//! sequence its element. Every consumer dispatches with `match`; there is
//! no way to view a class as a kind it is not.
//!
//! ## Unresolved and Resolved References
//!
//! Variants and sequences carry the raw dotted reference written in the
//! metadata (`tag_ref`, `length_ref`). Once the resolution pass validated
//! the reference, the node also carries a [`FieldPath`] to its target.
//! The path is the durable identity of the target; the live target class
//! is found by walking the path from its scope root (see
//! [`crate::ScopeRoots::field_class`]). No node holds a pointer into
//! another part of the tree.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field_path::{FieldIndex, FieldPath};

/// Character encoding of an integer or string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// No encoding: plain number.
    #[default]
    None,
    /// UTF-8 code unit.
    Utf8,
}

/// Preferred display base of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBase {
    /// Base 2.
    Binary,
    /// Base 8.
    Octal,
    /// Base 10.
    #[default]
    Decimal,
    /// Base 16.
    Hexadecimal,
}

/// Integer field class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntFieldClass {
    /// Size in bits.
    pub size: u32,
    /// Alignment in bits.
    #[serde(default = "default_alignment")]
    pub alignment: u32,
    /// Whether the integer is signed.
    #[serde(default)]
    pub is_signed: bool,
    /// Character encoding, if the integer holds text.
    #[serde(default)]
    pub encoding: Encoding,
    /// Preferred display base.
    #[serde(default)]
    pub base: DisplayBase,
}

fn default_alignment() -> u32 {
    1
}

impl IntFieldClass {
    /// An unsigned, bit-aligned integer of `size` bits.
    pub fn unsigned(size: u32) -> Self {
        Self {
            size,
            alignment: 1,
            is_signed: false,
            encoding: Encoding::None,
            base: DisplayBase::Decimal,
        }
    }

    /// A signed, bit-aligned integer of `size` bits.
    pub fn signed(size: u32) -> Self {
        Self {
            is_signed: true,
            ..Self::unsigned(size)
        }
    }

    /// Set the alignment in bits.
    pub fn aligned(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the encoding.
    pub fn encoded(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Inclusive range of enumeration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRange {
    /// Lower bound (inclusive).
    pub lower: i64,
    /// Upper bound (inclusive).
    pub upper: i64,
}

/// One label of an enumeration and the value ranges mapped to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMapping {
    /// The label, which is also the name of the variant option it selects.
    pub label: String,
    /// Value ranges mapped to the label.
    pub ranges: Vec<EnumRange>,
}

/// Enumeration field class: an integer plus labelled value ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumFieldClass {
    /// Underlying integer.
    pub int: IntFieldClass,
    /// Mappings in declaration order.
    #[serde(default)]
    pub mappings: Vec<EnumMapping>,
}

impl EnumFieldClass {
    /// An enumeration over `int` with no mappings.
    pub fn new(int: IntFieldClass) -> Self {
        Self {
            int,
            mappings: Vec::new(),
        }
    }

    /// Append a label mapped to the single range `lower..=upper`.
    pub fn map(mut self, label: impl Into<String>, lower: i64, upper: i64) -> Self {
        self.mappings.push(EnumMapping {
            label: label.into(),
            ranges: vec![EnumRange { lower, upper }],
        });
        self
    }
}

/// Floating-point field class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatFieldClass {
    /// Size in bits (32 or 64).
    pub size: u32,
    /// Alignment in bits.
    #[serde(default = "default_alignment")]
    pub alignment: u32,
}

/// Null-terminated string field class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringFieldClass {
    /// Character encoding.
    #[serde(default)]
    pub encoding: Encoding,
}

/// A structure member or variant option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFieldClass {
    /// Name after identifier unescaping.
    pub name: String,
    /// Name as written in the metadata, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_name: Option<String>,
    /// The member's field class.
    pub fc: FieldClass,
}

impl NamedFieldClass {
    /// A named field class whose original name equals its name.
    pub fn new(name: impl Into<String>, fc: FieldClass) -> Self {
        Self {
            name: name.into(),
            orig_name: None,
            fc,
        }
    }

    /// The name as written in the metadata. References are matched on it.
    pub fn orig_name(&self) -> &str {
        self.orig_name.as_deref().unwrap_or(&self.name)
    }
}

/// Structure field class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructFieldClass {
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<NamedFieldClass>,
}

impl StructFieldClass {
    /// An empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a structure from `(name, class)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateMember`] if two members share a name.
    pub fn from_members<N: Into<String>>(
        members: impl IntoIterator<Item = (N, FieldClass)>,
    ) -> Result<Self, SchemaError> {
        let mut s = Self::new();
        for (name, fc) in members {
            s.append_member(name, fc)?;
        }
        Ok(s)
    }

    /// Append a member.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateMember`] if the name is taken.
    pub fn append_member(
        &mut self,
        name: impl Into<String>,
        fc: FieldClass,
    ) -> Result<(), SchemaError> {
        push_unique(&mut self.members, NamedFieldClass::new(name, fc), "structure")
    }
}

/// Variant field class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantFieldClass {
    /// Options in declaration order.
    #[serde(default)]
    pub options: Vec<NamedFieldClass>,
    /// Raw dotted reference to the tag field.
    pub tag_ref: String,
    /// Validated path to the tag field, once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_path: Option<FieldPath>,
}

impl VariantFieldClass {
    /// A variant with no options, tagged by `tag_ref`.
    pub fn new(tag_ref: impl Into<String>) -> Self {
        Self {
            options: Vec::new(),
            tag_ref: tag_ref.into(),
            tag_path: None,
        }
    }

    /// Build a variant from its tag reference and `(name, class)` options.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateMember`] if two options share a name.
    pub fn from_options<N: Into<String>>(
        tag_ref: impl Into<String>,
        options: impl IntoIterator<Item = (N, FieldClass)>,
    ) -> Result<Self, SchemaError> {
        let mut v = Self::new(tag_ref);
        for (name, fc) in options {
            v.append_option(name, fc)?;
        }
        Ok(v)
    }

    /// Append an option.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateMember`] if the name is taken.
    pub fn append_option(
        &mut self,
        name: impl Into<String>,
        fc: FieldClass,
    ) -> Result<(), SchemaError> {
        push_unique(&mut self.options, NamedFieldClass::new(name, fc), "variant")
    }
}

/// Fixed-length array field class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayFieldClass {
    /// Element class.
    pub elem: Box<FieldClass>,
    /// Number of elements.
    pub length: u64,
    /// Whether the array holds UTF-8 text.
    #[serde(default)]
    pub is_text: bool,
}

impl ArrayFieldClass {
    /// An array of `length` elements of class `elem`.
    pub fn new(elem: FieldClass, length: u64) -> Self {
        Self {
            elem: Box::new(elem),
            length,
            is_text: false,
        }
    }
}

/// Dynamically-sized sequence field class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFieldClass {
    /// Element class.
    pub elem: Box<FieldClass>,
    /// Raw dotted reference to the length field.
    pub length_ref: String,
    /// Validated path to the length field, once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_path: Option<FieldPath>,
    /// Whether the sequence holds UTF-8 text.
    #[serde(default)]
    pub is_text: bool,
}

impl SequenceFieldClass {
    /// A sequence of `elem` whose length is the field named by `length_ref`.
    pub fn new(elem: FieldClass, length_ref: impl Into<String>) -> Self {
        Self {
            elem: Box::new(elem),
            length_ref: length_ref.into(),
            length_path: None,
            is_text: false,
        }
    }
}

/// A schema node: the class of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldClass {
    /// Integer.
    Int(IntFieldClass),
    /// Enumeration.
    Enum(EnumFieldClass),
    /// Floating-point number.
    Float(FloatFieldClass),
    /// String.
    String(StringFieldClass),
    /// Structure.
    Struct(StructFieldClass),
    /// Variant.
    Variant(VariantFieldClass),
    /// Array.
    Array(ArrayFieldClass),
    /// Sequence.
    Sequence(SequenceFieldClass),
}

impl FieldClass {
    /// A short human-readable name of the kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(i) if i.is_signed => "signed integer",
            Self::Int(_) => "unsigned integer",
            Self::Enum(_) => "enumeration",
            Self::Float(_) => "floating-point number",
            Self::String(_) => "string",
            Self::Struct(_) => "structure",
            Self::Variant(_) => "variant",
            Self::Array(_) => "array",
            Self::Sequence(_) => "sequence",
        }
    }

    /// True for structures, variants, arrays and sequences.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Self::Struct(_) | Self::Variant(_) | Self::Array(_) | Self::Sequence(_)
        )
    }

    /// True for arrays and sequences, whose only child is their element.
    pub fn is_array_like(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Sequence(_))
    }

    /// The integer view of an integer or enumeration class.
    pub fn as_int(&self) -> Option<&IntFieldClass> {
        match self {
            Self::Int(i) => Some(i),
            Self::Enum(e) => Some(&e.int),
            _ => None,
        }
    }

    /// Number of children: members, options, or 1 for arrays and sequences.
    pub fn child_count(&self) -> usize {
        match self {
            Self::Struct(s) => s.members.len(),
            Self::Variant(v) => v.options.len(),
            Self::Array(_) | Self::Sequence(_) => 1,
            _ => 0,
        }
    }

    /// The child at `index`, or `None` when this class has no such child.
    pub fn child(&self, index: FieldIndex) -> Option<&FieldClass> {
        match (self, index) {
            (Self::Struct(s), FieldIndex::Member(i)) => s.members.get(i).map(|m| &m.fc),
            (Self::Variant(v), FieldIndex::Member(i)) => v.options.get(i).map(|o| &o.fc),
            (Self::Array(a), FieldIndex::Element) => Some(a.elem.as_ref()),
            (Self::Sequence(s), FieldIndex::Element) => Some(s.elem.as_ref()),
            _ => None,
        }
    }

    /// Mutable access to the child at `index`.
    pub fn child_mut(&mut self, index: FieldIndex) -> Option<&mut FieldClass> {
        match (self, index) {
            (Self::Struct(s), FieldIndex::Member(i)) => s.members.get_mut(i).map(|m| &mut m.fc),
            (Self::Variant(v), FieldIndex::Member(i)) => {
                v.options.get_mut(i).map(|o| &mut o.fc)
            }
            (Self::Array(a), FieldIndex::Element) => Some(a.elem.as_mut()),
            (Self::Sequence(s), FieldIndex::Element) => Some(s.elem.as_mut()),
            _ => None,
        }
    }

    /// Index of the member or option whose original name is `orig_name`.
    ///
    /// Always `None` for classes other than structures and variants.
    pub fn index_of(&self, orig_name: &str) -> Option<FieldIndex> {
        let named = match self {
            Self::Struct(s) => &s.members,
            Self::Variant(v) => &v.options,
            _ => return None,
        };
        named
            .iter()
            .position(|m| m.orig_name() == orig_name)
            .map(FieldIndex::Member)
    }

    /// The descendant at `indices` relative to this class.
    pub fn descendant(&self, indices: &[FieldIndex]) -> Option<&FieldClass> {
        indices
            .iter()
            .try_fold(self, |fc, &index| fc.child(index))
    }

    /// Mutable access to the descendant at `indices`.
    pub fn descendant_mut(&mut self, indices: &[FieldIndex]) -> Option<&mut FieldClass> {
        let mut fc = self;
        for &index in indices {
            fc = fc.child_mut(index)?;
        }
        Some(fc)
    }

    /// Check that no structure or variant in this tree repeats a name.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError::DuplicateMember`] found.
    pub fn check_unique_names(&self) -> Result<(), SchemaError> {
        match self {
            Self::Struct(s) => check_named(&s.members, "structure"),
            Self::Variant(v) => check_named(&v.options, "variant"),
            Self::Array(a) => a.elem.check_unique_names(),
            Self::Sequence(s) => s.elem.check_unique_names(),
            _ => Ok(()),
        }
    }
}

fn push_unique(
    named: &mut Vec<NamedFieldClass>,
    new: NamedFieldClass,
    container: &'static str,
) -> Result<(), SchemaError> {
    if named.iter().any(|m| m.name == new.name) {
        return Err(SchemaError::DuplicateMember {
            name: new.name,
            container,
        });
    }
    named.push(new);
    Ok(())
}

fn check_named(named: &[NamedFieldClass], container: &'static str) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for m in named {
        if !seen.insert(m.name.as_str()) {
            return Err(SchemaError::DuplicateMember {
                name: m.name.clone(),
                container,
            });
        }
        m.fc.check_unique_names()?;
    }
    Ok(())
}

impl From<IntFieldClass> for FieldClass {
    fn from(fc: IntFieldClass) -> Self {
        Self::Int(fc)
    }
}

impl From<EnumFieldClass> for FieldClass {
    fn from(fc: EnumFieldClass) -> Self {
        Self::Enum(fc)
    }
}

impl From<StructFieldClass> for FieldClass {
    fn from(fc: StructFieldClass) -> Self {
        Self::Struct(fc)
    }
}

impl From<VariantFieldClass> for FieldClass {
    fn from(fc: VariantFieldClass) -> Self {
        Self::Variant(fc)
    }
}

impl From<ArrayFieldClass> for FieldClass {
    fn from(fc: ArrayFieldClass) -> Self {
        Self::Array(fc)
    }
}

impl From<SequenceFieldClass> for FieldClass {
    fn from(fc: SequenceFieldClass) -> Self {
        Self::Sequence(fc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FieldClass {
        let inner = StructFieldClass::from_members([
            ("x", IntFieldClass::unsigned(8).into()),
            ("y", FieldClass::String(StringFieldClass::default())),
        ])
        .unwrap();
        StructFieldClass::from_members([
            ("len", IntFieldClass::unsigned(32).into()),
            ("items", ArrayFieldClass::new(inner.into(), 4).into()),
        ])
        .unwrap()
        .into()
    }

    #[test]
    fn duplicate_member_rejected() {
        let err = StructFieldClass::from_members([
            ("a", FieldClass::from(IntFieldClass::unsigned(8))),
            ("a", FieldClass::from(IntFieldClass::unsigned(8))),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateMember {
                name: "a".into(),
                container: "structure"
            }
        );
    }

    #[test]
    fn child_navigation() {
        let fc = sample();
        assert_eq!(fc.child_count(), 2);
        let items = fc.child(FieldIndex::Member(1)).unwrap();
        assert!(items.is_array_like());
        assert!(items.child(FieldIndex::Member(0)).is_none());
        let elem = items.child(FieldIndex::Element).unwrap();
        assert_eq!(elem.index_of("y"), Some(FieldIndex::Member(1)));
        assert_eq!(elem.index_of("z"), None);
    }

    #[test]
    fn descendant_walks_indices() {
        let fc = sample();
        let y = fc
            .descendant(&[FieldIndex::Member(1), FieldIndex::Element, FieldIndex::Member(1)])
            .unwrap();
        assert_eq!(y.kind_name(), "string");
        assert!(fc.descendant(&[FieldIndex::Member(5)]).is_none());
        assert!(fc.descendant(&[]).is_some());
    }

    #[test]
    fn lookup_uses_original_name() {
        let mut s = StructFieldClass::new();
        s.members.push(NamedFieldClass {
            name: "field".into(),
            orig_name: Some("_field".into()),
            fc: IntFieldClass::unsigned(8).into(),
        });
        let fc = FieldClass::Struct(s);
        assert_eq!(fc.index_of("_field"), Some(FieldIndex::Member(0)));
        assert_eq!(fc.index_of("field"), None);
    }

    #[test]
    fn int_view_of_enum() {
        let e: FieldClass = EnumFieldClass::new(IntFieldClass::signed(8)).into();
        assert!(e.as_int().unwrap().is_signed);
        assert!(FieldClass::String(StringFieldClass::default()).as_int().is_none());
    }

    #[test]
    fn check_unique_names_finds_nested_duplicates() {
        let mut inner = StructFieldClass::new();
        inner.members.push(NamedFieldClass::new("a", IntFieldClass::unsigned(8).into()));
        inner.members.push(NamedFieldClass::new("a", IntFieldClass::unsigned(8).into()));
        let outer = StructFieldClass::from_members([("s", FieldClass::Struct(inner))]).unwrap();
        assert!(FieldClass::Struct(outer).check_unique_names().is_err());
        assert!(sample().check_unique_names().is_ok());
    }

    #[test]
    fn deserializes_tagged_representation() {
        let json = r#"{
            "type": "struct",
            "members": [
                {"name": "len", "fc": {"type": "int", "size": 8}},
                {"name": "data", "fc": {"type": "sequence", "length_ref": "len",
                                        "elem": {"type": "int", "size": 8}}}
            ]
        }"#;
        let fc: FieldClass = serde_json::from_str(json).unwrap();
        let FieldClass::Sequence(seq) = fc.child(FieldIndex::Member(1)).unwrap() else {
            panic!("expected a sequence");
        };
        assert_eq!(seq.length_ref, "len");
        assert!(seq.length_path.is_none());
    }
}
