//! Serializer extension capability
//!
//! The serializer delegates two concerns to the surrounding compiler: the
//! decision whether a callable needs its lowered body embedded into the
//! metadata (so other units can inline across module boundaries), and the
//! production of those body payloads. Bodies are opaque byte payloads
//! here; this crate never decodes them.

use crate::records::{ClassRecord, ConstructorRecord, FunctionRecord, PropertyRecord};
use crate::serializer::DeclarationSerializer;
use vela_ir::{DeclArena, DeclId};

/// Hooks the serializer calls while encoding declarations
pub trait SerializerExtension {
    /// Whether `decl` (a function, accessor, or constructor) needs its
    /// serialized body embedded
    fn needs_serialized_ir(&self, _arena: &DeclArena, _decl: DeclId) -> bool {
        false
    }

    /// Produce the serialized body of `decl`. `body` is a serializer
    /// derived for the body's internal scope; implementations use it to
    /// intern any types the body mentions.
    fn serialize_inline_body(
        &self,
        _arena: &DeclArena,
        _decl: DeclId,
        _body: &DeclarationSerializer<'_>,
    ) -> Vec<u8> {
        Vec::new()
    }

    /// Attach a serialized body to a function record
    fn add_function_ir(&self, record: &mut FunctionRecord, body: Vec<u8>) {
        record.ir_body = Some(body);
    }

    /// Attach a serialized body to a constructor record
    fn add_constructor_ir(&self, record: &mut ConstructorRecord, body: Vec<u8>) {
        record.ir_body = Some(body);
    }

    /// Attach a serialized getter body to a property record
    fn add_getter_ir(&self, record: &mut PropertyRecord, body: Vec<u8>) {
        record.getter_ir = Some(body);
    }

    /// Attach a serialized setter body to a property record
    fn add_setter_ir(&self, record: &mut PropertyRecord, body: Vec<u8>) {
        record.setter_ir = Some(body);
    }

    /// Amend a class record with extension-specific fields
    fn extend_class(&self, _arena: &DeclArena, _decl: DeclId, _record: &mut ClassRecord) {}

    /// Amend a function record with extension-specific fields
    fn extend_function(&self, _arena: &DeclArena, _decl: DeclId, _record: &mut FunctionRecord) {}

    /// Amend a property record with extension-specific fields
    fn extend_property(&self, _arena: &DeclArena, _decl: DeclId, _record: &mut PropertyRecord) {}

    /// Amend a constructor record with extension-specific fields
    fn extend_constructor(
        &self,
        _arena: &DeclArena,
        _decl: DeclId,
        _record: &mut ConstructorRecord,
    ) {
    }
}

/// Extension with no IR awareness: nothing is embedded
pub struct OrdinaryExtension;

impl SerializerExtension for OrdinaryExtension {}
