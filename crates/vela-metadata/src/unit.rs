//! Metadata unit format
//!
//! A unit is the versioned binary container for one module's encoded
//! declarations: a fixed header (magic, format version, flags, crc32
//! checksum), the session string table, the unit-level type and
//! version-requirement tables, and the top-level records.

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};
use crate::error::{SerializeError, SerializeResult};
use crate::extension::SerializerExtension;
use crate::records::{
    ClassRecord, ConstructorRecord, FunctionRecord, PropertyRecord, TypeTableRecord,
    VersionRequirement,
};
use crate::serializer::{DeclarationSerializer, SerializerContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vela_ir::{DeclId, DeclKind};

/// Magic number for Vela metadata units: "VMET"
pub const MAGIC: [u8; 4] = *b"VMET";

/// Current metadata format version
pub const VERSION: u32 = 1;

/// Unit flags
pub mod flags {
    /// Unit embeds serialized bodies for cross-module inlining
    pub const HAS_EMBEDDED_IR: u32 = 1 << 0;
}

/// Unit encoding/decoding errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid magic number
    #[error("Invalid magic number: expected VMET, got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unsupported version
    #[error("Unsupported version: {0} (current: {VERSION})")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("Checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        /// Checksum stored in the header
        expected: u32,
        /// Checksum computed over the payload
        actual: u32,
    },
}

/// One module's encoded metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataUnit {
    /// Magic number (must be "VMET")
    pub magic: [u8; 4],
    /// Metadata format version
    pub version: u32,
    /// Unit flags
    pub flags: u32,
    /// Module name
    pub name: String,
    /// Session string table, in id order
    pub strings: Vec<String>,
    /// Unit-level type table
    pub types: TypeTableRecord,
    /// Unit-level version-requirement table, in id order
    pub version_requirements: Vec<VersionRequirement>,
    /// Top-level classes
    pub classes: Vec<ClassRecord>,
    /// Top-level functions
    pub functions: Vec<FunctionRecord>,
    /// Top-level properties
    pub properties: Vec<PropertyRecord>,
}

impl MetadataUnit {
    /// Create a new empty unit
    pub fn new(name: String) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
            name,
            strings: Vec::new(),
            types: TypeTableRecord::default(),
            version_requirements: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Validate unit structure
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.magic != MAGIC {
            return Err(MetadataError::InvalidMagic(self.magic));
        }
        if self.version != VERSION {
            return Err(MetadataError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Encode the unit to binary (.vmeta)
    ///
    /// Format:
    /// - Header: magic (4 bytes) + version (u32) + flags (u32) + checksum (u32)
    /// - Module name
    /// - String table
    /// - Type table
    /// - Version-requirement table
    /// - Class / function / property records
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = MetadataWriter::new();

        let header_start = writer.offset();
        writer.buffer.extend_from_slice(&self.magic);
        writer.emit_u32(self.version);
        writer.emit_u32(self.flags);
        let checksum_offset = writer.offset();
        writer.emit_u32(0); // Placeholder for checksum

        writer.emit_string(&self.name);

        writer.emit_u32(self.strings.len() as u32);
        for string in &self.strings {
            writer.emit_string(string);
        }

        self.types.encode(&mut writer);

        writer.emit_u32(self.version_requirements.len() as u32);
        for requirement in &self.version_requirements {
            requirement.encode(&mut writer);
        }

        writer.emit_u32(self.classes.len() as u32);
        for class in &self.classes {
            class.encode(&mut writer);
        }

        writer.emit_u32(self.functions.len() as u32);
        for function in &self.functions {
            function.encode(&mut writer);
        }

        writer.emit_u32(self.properties.len() as u32);
        for property in &self.properties {
            property.encode(&mut writer);
        }

        // Checksum covers everything after the 16-byte header
        let payload = &writer.buffer[header_start + 16..];
        let checksum = crc32fast::hash(payload);
        writer.patch_u32(checksum_offset, checksum);

        writer.into_bytes()
    }

    /// Decode a unit from binary
    pub fn decode(data: &[u8]) -> Result<Self, MetadataError> {
        let mut reader = MetadataReader::new(data);

        let magic = reader.read_bytes(4)?;
        let magic: [u8; 4] = magic.try_into().expect("read_bytes returned 4 bytes");
        if magic != MAGIC {
            return Err(MetadataError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(MetadataError::UnsupportedVersion(version));
        }

        let unit_flags = reader.read_u32()?;
        let stored_checksum = reader.read_u32()?;

        let payload = &data[16..];
        let calculated_checksum = crc32fast::hash(payload);
        if stored_checksum != calculated_checksum {
            return Err(MetadataError::ChecksumMismatch {
                expected: stored_checksum,
                actual: calculated_checksum,
            });
        }

        let name = reader.read_string()?;

        let count = reader.read_u32()? as usize;
        let mut strings = Vec::with_capacity(count);
        for _ in 0..count {
            strings.push(reader.read_string()?);
        }

        let types = TypeTableRecord::decode(&mut reader)?;

        let count = reader.read_u32()? as usize;
        let mut version_requirements = Vec::with_capacity(count);
        for _ in 0..count {
            version_requirements.push(VersionRequirement::decode(&mut reader)?);
        }

        let count = reader.read_u32()? as usize;
        let mut classes = Vec::with_capacity(count);
        for _ in 0..count {
            classes.push(ClassRecord::decode(&mut reader)?);
        }

        let count = reader.read_u32()? as usize;
        let mut functions = Vec::with_capacity(count);
        for _ in 0..count {
            functions.push(FunctionRecord::decode(&mut reader)?);
        }

        let count = reader.read_u32()? as usize;
        let mut properties = Vec::with_capacity(count);
        for _ in 0..count {
            properties.push(PropertyRecord::decode(&mut reader)?);
        }

        Ok(Self {
            magic,
            version,
            flags: unit_flags,
            name,
            strings,
            types,
            version_requirements,
            classes,
            functions,
            properties,
        })
    }
}

fn function_has_ir(function: &FunctionRecord) -> bool {
    function.ir_body.is_some()
}

fn constructor_has_ir(constructor: &ConstructorRecord) -> bool {
    constructor.ir_body.is_some()
}

fn property_has_ir(property: &PropertyRecord) -> bool {
    property.getter_ir.is_some() || property.setter_ir.is_some()
}

fn class_has_ir(class: &ClassRecord) -> bool {
    class.functions.iter().any(function_has_ir)
        || class.constructors.iter().any(constructor_has_ir)
        || class.properties.iter().any(property_has_ir)
        || class.nested_classes.iter().any(class_has_ir)
}

/// Serialize a module's top-level declarations into a unit: one committed
/// top-to-bottom pass, after which the serializer chain is discarded
pub fn serialize_unit<'a>(
    ctx: &'a SerializerContext<'a>,
    name: &str,
    declarations: &[DeclId],
    extension: &'a dyn SerializerExtension,
) -> SerializeResult<MetadataUnit> {
    let top = DeclarationSerializer::top_level(ctx, extension);

    let mut unit = MetadataUnit::new(name.to_string());
    for &decl in declarations {
        match &ctx.arena.get(decl).kind {
            DeclKind::Class(_) => {
                let serializer = DeclarationSerializer::for_class(ctx, decl, extension)?;
                unit.classes.push(serializer.class_record(decl)?);
            }
            DeclKind::Function(_) => unit.functions.push(top.function_record(decl)?),
            DeclKind::Property(_) => unit.properties.push(top.property_record(decl)?),
            _ => {
                return Err(SerializeError::UnsupportedTopLevel {
                    name: ctx.arena.name(decl).to_string(),
                })
            }
        }
    }

    unit.types = top.type_table_record().unwrap_or_default();
    unit.version_requirements = top.version_requirement_list();
    // The string table is snapshotted last: every record above interned
    // its names into the shared session table
    unit.strings = ctx.string_list();

    if unit.functions.iter().any(function_has_ir)
        || unit.properties.iter().any(property_has_ir)
        || unit.classes.iter().any(class_has_ir)
    {
        unit.flags |= flags::HAS_EMBEDDED_IR;
    }
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_creation() {
        let unit = MetadataUnit::new("main".to_string());
        assert_eq!(unit.magic, MAGIC);
        assert_eq!(unit.version, VERSION);
        assert_eq!(unit.flags, 0);
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn test_empty_unit_round_trip() {
        let unit = MetadataUnit::new("empty".to_string());
        let bytes = unit.encode();

        let decoded = MetadataUnit::decode(&bytes).unwrap();
        assert_eq!(decoded, unit);
    }

    #[test]
    fn test_checksum_validation() {
        let unit = MetadataUnit::new("main".to_string());
        let mut bytes = unit.encode();

        // Corrupt a payload byte
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let result = MetadataUnit::decode(&bytes);
        assert!(matches!(
            result,
            Err(MetadataError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_magic_number() {
        let mut bytes = vec![b'X', b'X', b'X', b'X'];
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let result = MetadataUnit::decode(&bytes);
        assert!(matches!(result, Err(MetadataError::InvalidMagic(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"VMET");
        bytes.extend_from_slice(&999u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        let result = MetadataUnit::decode(&bytes);
        assert!(matches!(result, Err(MetadataError::UnsupportedVersion(999))));
    }
}
