//! Vela Metadata Serialization
//!
//! This crate encodes finalized declaration trees into the portable,
//! versioned `.vmeta` binary format: deduplicating intern tables, one
//! record per declaration, version-requirement markers for
//! forward-compatibility gating, and optional embedding of lowered bodies
//! so other compilation units can inline across module boundaries.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod encoder;
pub mod error;
pub mod extension;
pub mod records;
pub mod serializer;
pub mod tables;
pub mod unit;

pub use encoder::{DecodeError, MetadataReader, MetadataWriter};
pub use error::{SerializeError, SerializeResult};
pub use extension::{OrdinaryExtension, SerializerExtension};
pub use records::{
    ClassRecord, ConstructorRecord, ContractRecord, EffectRecord, FunctionRecord, PropertyRecord,
    TypeParameterRecord, TypeRecord, TypeRef, TypeTableRecord, ValueParameterRecord, VersionKind,
    VersionRequirement,
};
pub use serializer::{DeclarationSerializer, SerializerContext};
pub use tables::{InternTable, StringTable, TypeParameterTable, TypeTable, VersionRequirementTable};
pub use unit::{serialize_unit, MetadataError, MetadataUnit};
