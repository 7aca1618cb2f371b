//! Vela Backend Lowering
//!
//! Transformation passes that rewrite resolved declarations into the
//! compiler-internal constructs later phases consume. The enum lowering
//! here synthesizes the holder object, value-array storage, and ordinal
//! table for each enum class.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod enums;
pub mod error;
pub mod overrides;

pub use enums::{
    create_lowered_enum, record_synthetic_property, synthesize_values_property, LoweredEnum,
};
pub use error::{LowerError, LowerResult};
pub use overrides::{OverrideSynthesizer, SupertypeOverrides, SyntheticMember};
