//! # Error Types: Schema Model Errors
//!
//! Errors raised while building or navigating the schema model. Resolution
//! errors live in `tsdl-resolve`; this crate only reports structural
//! problems with the model itself.

use thiserror::Error;

use crate::trace_class::{EventClassId, StreamClassId};

/// Error in the schema model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A structure member or variant option name appears twice.
    #[error("duplicate member name `{name}` in {container}")]
    DuplicateMember {
        /// The repeated name.
        name: String,
        /// `"structure"` or `"variant"`.
        container: &'static str,
    },

    /// A field index is negative and is not the element index (-1).
    #[error("invalid field index {0}: only -1 may be negative")]
    InvalidFieldIndex(i64),

    /// No stream class has this identifier.
    #[error("unknown {0}")]
    UnknownStreamClass(StreamClassId),

    /// No event class with this identifier in the given stream class.
    #[error("unknown {event} in {stream}")]
    UnknownEventClass {
        /// Stream class searched.
        stream: StreamClassId,
        /// Missing event class.
        event: EventClassId,
    },
}
