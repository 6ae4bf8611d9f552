//! # Field Paths: Structural Addresses of Fields
//!
//! A `FieldPath` names one field of a schema by its root [`Scope`] and the
//! sequence of child indices to follow from that scope's root field class.
//! Following a path never compares names, which is what lets a decoder
//! locate a variant's tag or a sequence's length in constant time.
//!
//! ## Element Index
//!
//! Arrays and sequences have a single child, their element. Its index is
//! [`FieldIndex::Element`], which prints and serializes as `-1` and orders
//! before every member index.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::scope::Scope;

/// The position of a child field class within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum FieldIndex {
    /// The element of an array or sequence.
    Element,
    /// A named member of a structure or option of a variant.
    Member(usize),
}

impl FieldIndex {
    /// The signed representation: `-1` for the element, the member index otherwise.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Element => -1,
            Self::Member(i) => i as i64,
        }
    }

    /// Returns the member index, if this is not the element index.
    pub fn member(self) -> Option<usize> {
        match self {
            Self::Element => None,
            Self::Member(i) => Some(i),
        }
    }
}

impl From<FieldIndex> for i64 {
    fn from(index: FieldIndex) -> i64 {
        index.as_i64()
    }
}

impl TryFrom<i64> for FieldIndex {
    type Error = SchemaError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Element),
            v if v >= 0 => usize::try_from(v)
                .map(Self::Member)
                .map_err(|_| SchemaError::InvalidFieldIndex(v)),
            v => Err(SchemaError::InvalidFieldIndex(v)),
        }
    }
}

impl fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// An immutable structural path: a root scope and child indices from it.
///
/// A path with no index denotes the scope root itself. Such a path is a
/// valid position but never a valid variant tag or sequence length target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    root: Scope,
    indices: Vec<FieldIndex>,
}

impl FieldPath {
    /// Create a path from its root scope and indices.
    pub fn new(root: Scope, indices: Vec<FieldIndex>) -> Self {
        Self { root, indices }
    }

    /// The path of a scope root.
    pub fn root_of(root: Scope) -> Self {
        Self::new(root, Vec::new())
    }

    /// The root scope.
    pub fn root(&self) -> Scope {
        self.root
    }

    /// The child indices, outermost first.
    pub fn indices(&self) -> &[FieldIndex] {
        &self.indices
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the path denotes the scope root.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Index at `depth`, if the path is that long.
    pub fn get(&self, depth: usize) -> Option<FieldIndex> {
        self.indices.get(depth).copied()
    }

    /// True when both paths share a root and `prefix`'s indices start this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.root == prefix.root && self.indices.starts_with(&prefix.indices)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.root)?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_orders_before_members() {
        assert!(FieldIndex::Element < FieldIndex::Member(0));
        assert!(FieldIndex::Member(0) < FieldIndex::Member(1));
    }

    #[test]
    fn index_signed_conversions() {
        assert_eq!(FieldIndex::try_from(-1).unwrap(), FieldIndex::Element);
        assert_eq!(FieldIndex::try_from(4).unwrap(), FieldIndex::Member(4));
        assert!(FieldIndex::try_from(-2).is_err());
        assert_eq!(i64::from(FieldIndex::Element), -1);
    }

    #[test]
    fn display() {
        let path = FieldPath::new(
            Scope::EventPayload,
            vec![FieldIndex::Member(0), FieldIndex::Member(2), FieldIndex::Element],
        );
        assert_eq!(path.to_string(), "event-payload[0, 2, -1]");
        assert_eq!(FieldPath::root_of(Scope::PacketHeader).to_string(), "packet-header[]");
    }

    #[test]
    fn serde_uses_signed_indices() {
        let path = FieldPath::new(
            Scope::PacketContext,
            vec![FieldIndex::Member(1), FieldIndex::Element],
        );
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"{"root":"packet-context","indices":[1,-1]}"#);
        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn rejects_negative_indices_other_than_element() {
        let json = r#"{"root":"packet-context","indices":[-3]}"#;
        assert!(serde_json::from_str::<FieldPath>(json).is_err());
    }

    #[test]
    fn starts_with_requires_same_root() {
        let a = FieldPath::new(Scope::EventPayload, vec![FieldIndex::Member(1)]);
        let b = FieldPath::new(
            Scope::EventPayload,
            vec![FieldIndex::Member(1), FieldIndex::Member(0)],
        );
        let c = FieldPath::new(Scope::EventHeader, vec![FieldIndex::Member(1)]);
        assert!(b.starts_with(&a));
        assert!(!a.starts_with(&b));
        assert!(!b.starts_with(&c));
    }
}
