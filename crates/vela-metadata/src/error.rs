//! Serialization errors
//!
//! Inputs are contractually well-formed by the time serialization runs, so
//! every failure here is a fatal internal-consistency violation that
//! aborts the metadata pass for the module.

use thiserror::Error;

/// Result alias for the serializer
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Fatal serialization failures
#[derive(Debug, Error)]
pub enum SerializeError {
    /// A declaration id resolved to the wrong kind of declaration
    #[error("Declaration `{name}` is not a {expected}")]
    WrongKind {
        /// Name of the offending declaration
        name: String,
        /// Kind the serializer expected
        expected: &'static str,
    },

    /// A declaration kind that cannot be encoded at the top level
    #[error("Declaration `{name}` cannot appear at the top level of a unit")]
    UnsupportedTopLevel {
        /// Name of the offending declaration
        name: String,
    },

    /// Catch-all for malformed or partially lowered trees
    #[error("Internal serializer error: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}
