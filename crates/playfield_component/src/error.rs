//! Component-layer error types.

use crate::component::ComponentTypeId;

/// Errors raised by type-erased column storage, schemes, and the registry.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A type-erased column operation was invoked against a column of a
    /// different runtime type.
    #[error("component type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch {
        /// Name of the type the caller asked for.
        expected: &'static str,
        /// Name of the type actually stored in the column.
        found: &'static str,
    },

    /// A component class was registered twice under the same name or id.
    #[error("component '{0}' is already registered")]
    AlreadyRegistered(&'static str),

    /// A lookup referenced a component class that was never registered.
    #[error("no component registered for '{0}'")]
    NotRegistered(String),

    /// A scheme insertion would duplicate a type already present.
    #[error("type {0} is already part of the scheme")]
    DuplicateType(ComponentTypeId),

    /// A scheme lookup or removal referenced a type that is not present.
    #[error("type {0} is not part of the scheme")]
    MissingType(ComponentTypeId),

    /// A positional scheme operation referenced an ordinal past the end.
    #[error("ordinal {ordinal} out of range for scheme of {len} types")]
    OrdinalOutOfRange {
        /// The offending position.
        ordinal: usize,
        /// Number of types in the scheme.
        len: usize,
    },

    /// Failed to encode a component value to MessagePack.
    #[error("failed to encode component: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a component value from MessagePack.
    #[error("failed to decode component: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
