//! Lowering errors
//!
//! Every failure here is an internal-consistency violation: the frontend
//! guarantees well-formed input, so none of these are user-facing
//! diagnostics. A lowering error aborts compilation of the module.

use thiserror::Error;

/// Result alias for lowering passes
pub type LowerResult<T> = Result<T, LowerError>;

/// Fatal lowering failures
#[derive(Debug, Error)]
pub enum LowerError {
    /// Enum lowering invoked on a non-enum class
    #[error("Declaration `{name}` is not an enum class")]
    NotAnEnum {
        /// Name of the offending declaration
        name: String,
    },

    /// Enum lowering invoked on an enum with no entries
    #[error("Enum class `{name}` has no entries")]
    EnumWithoutEntries {
        /// Name of the offending declaration
        name: String,
    },

    /// The root class lacks its no-argument constructor
    #[error("Builtin class `{class}` has no usable no-argument constructor")]
    MissingBuiltinConstructor {
        /// Name of the builtin class
        class: String,
    },

    /// The array class lacks its element-access function
    #[error("Builtin array class has no element-access function")]
    MissingArrayElementAccess,

    /// Catch-all for malformed trees
    #[error("Internal lowering error: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },
}
