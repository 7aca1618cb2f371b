//! Encoded declaration records
//!
//! ## Wire format
//!
//! ```text
//! All integers little-endian. str = u32 length + UTF-8 bytes.
//! opt(X)   = bool(u8) + X when present
//! vec(X)   = u32 count + X*
//! bytes    = u32 length + raw payload
//!
//! TypeRef        = tag(u8): 0 inline TypeRecord | 1 table index(u32)
//! TypeRecord     = tag(u8): 0 class  (name-idx u32 + vec(TypeRef))
//!                           1 array  (TypeRef)
//!                           2 param  (interner id u32)
//!                           3 fn     (vec(TypeRef) + TypeRef + suspend bool)
//!                           4 error
//! Function       = flags u32 + name-idx u32 + vec(TypeParameter)
//!                  + opt(receiver TypeRef) + vec(ValueParameter)
//!                  + return TypeRef + opt(TypeTable)
//!                  + vec(version-requirement id u32) + opt(Contract)
//!                  + opt(ir bytes)
//! ```
//!
//! The remaining records follow the same field-by-field discipline; see
//! each `encode` below.

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};
use serde::{Deserialize, Serialize};
use vela_ir::{
    ClassDecl, ClassKind, ConstructorDecl, Contract, ContractEffect, FunctionDecl, InvocationKind,
    MemberKind, Modality, PropertyDecl, ValueParameterDecl, Variance, Visibility,
};

/// Packed flag words
///
/// The low bits are shared by every declaration record: bit 0 is the
/// annotation marker, bits 1-3 the visibility, bits 4-5 the modality.
/// Bits 6-8 hold the member kind (callables) or the class kind (classes).
/// Bits from 9 up are kind-specific modifiers.
pub mod flags {
    /// Declaration carries annotations
    pub const HAS_ANNOTATIONS: u32 = 1 << 0;
    /// Shift of the visibility field
    pub const VISIBILITY_SHIFT: u32 = 1;
    /// Mask of the visibility field
    pub const VISIBILITY_MASK: u32 = 0b111 << 1;
    /// Shift of the modality field
    pub const MODALITY_SHIFT: u32 = 4;
    /// Mask of the modality field
    pub const MODALITY_MASK: u32 = 0b11 << 4;
    /// Shift of the member-kind field (callable records)
    pub const MEMBER_KIND_SHIFT: u32 = 6;
    /// Mask of the member-kind field
    pub const MEMBER_KIND_MASK: u32 = 0b111 << 6;
    /// Shift of the class-kind field (class records)
    pub const CLASS_KIND_SHIFT: u32 = 6;
    /// Mask of the class-kind field
    pub const CLASS_KIND_MASK: u32 = 0b111 << 6;

    // Function modifiers
    /// `operator`
    pub const IS_OPERATOR: u32 = 1 << 9;
    /// `infix`
    pub const IS_INFIX: u32 = 1 << 10;
    /// `inline`
    pub const IS_INLINE: u32 = 1 << 11;
    /// `tailrec`
    pub const IS_TAILREC: u32 = 1 << 12;
    /// `external`
    pub const IS_EXTERNAL: u32 = 1 << 13;
    /// `suspend`
    pub const IS_SUSPEND: u32 = 1 << 14;
    /// expect declaration
    pub const IS_EXPECT: u32 = 1 << 15;

    // Property modifiers (same bit range, property records only)
    /// Mutable property
    pub const IS_VAR: u32 = 1 << 9;
    /// Delegated property
    pub const IS_DELEGATED: u32 = 1 << 10;
    /// Property has a getter
    pub const HAS_GETTER: u32 = 1 << 11;
    /// Property has a setter
    pub const HAS_SETTER: u32 = 1 << 12;
    /// Property has a backing field
    pub const HAS_BACKING_FIELD: u32 = 1 << 13;

    // Constructor modifiers
    /// Primary constructor
    pub const IS_PRIMARY: u32 = 1 << 9;
    /// Delegating constructor
    pub const IS_DELEGATING: u32 = 1 << 10;

    // Value-parameter modifiers
    /// Parameter has a default value
    pub const HAS_DEFAULT: u32 = 1 << 1;
    /// Vararg parameter
    pub const IS_VARARG: u32 = 1 << 2;
    /// `crossinline`
    pub const IS_CROSSINLINE: u32 = 1 << 3;
    /// `noinline`
    pub const IS_NOINLINE: u32 = 1 << 4;

    /// True if `bit` is set in `word`
    pub const fn has(word: u32, bit: u32) -> bool {
        word & bit != 0
    }

    /// Visibility field of `word`
    pub const fn visibility_of(word: u32) -> u32 {
        (word & VISIBILITY_MASK) >> VISIBILITY_SHIFT
    }

    /// Modality field of `word`
    pub const fn modality_of(word: u32) -> u32 {
        (word & MODALITY_MASK) >> MODALITY_SHIFT
    }
}

/// Variance codes used in type-parameter records
pub mod variance {
    /// Invariant
    pub const INVARIANT: u8 = 0;
    /// Contravariant
    pub const IN: u8 = 1;
    /// Covariant
    pub const OUT: u8 = 2;
}

/// Invocation-count codes used in contract effects
pub mod invocation {
    /// Called at most once
    pub const AT_MOST_ONCE: u8 = 0;
    /// Called exactly once
    pub const EXACTLY_ONCE: u8 = 1;
    /// Called at least once
    pub const AT_LEAST_ONCE: u8 = 2;
}

/// Visibility wire code
pub fn visibility_code(visibility: Visibility) -> u32 {
    match visibility {
        Visibility::Public => 0,
        Visibility::Internal => 1,
        Visibility::Protected => 2,
        Visibility::Private => 3,
    }
}

/// Modality wire code
pub fn modality_code(modality: Modality) -> u32 {
    match modality {
        Modality::Final => 0,
        Modality::Open => 1,
        Modality::Abstract => 2,
    }
}

/// Member-kind wire code
pub fn member_kind_code(member_kind: MemberKind) -> u32 {
    match member_kind {
        MemberKind::Declaration => 0,
        MemberKind::FakeOverride => 1,
        MemberKind::Delegation => 2,
        MemberKind::Synthesized => 3,
    }
}

/// Class-kind wire code
pub fn class_kind_code(class_kind: ClassKind) -> u32 {
    match class_kind {
        ClassKind::Class => 0,
        ClassKind::Interface => 1,
        ClassKind::Object => 2,
        ClassKind::Enum => 3,
    }
}

/// Variance wire code
pub fn variance_code(value: Variance) -> u8 {
    match value {
        Variance::Invariant => variance::INVARIANT,
        Variance::In => variance::IN,
        Variance::Out => variance::OUT,
    }
}

fn invocation_code(kind: InvocationKind) -> u8 {
    match kind {
        InvocationKind::AtMostOnce => invocation::AT_MOST_ONCE,
        InvocationKind::ExactlyOnce => invocation::EXACTLY_ONCE,
        InvocationKind::AtLeastOnce => invocation::AT_LEAST_ONCE,
    }
}

/// Pack the flag word of a function record
pub fn function_flags(decl: &FunctionDecl) -> u32 {
    let mut word = 0;
    if decl.has_annotations {
        word |= flags::HAS_ANNOTATIONS;
    }
    word |= visibility_code(decl.visibility) << flags::VISIBILITY_SHIFT;
    word |= modality_code(decl.modality) << flags::MODALITY_SHIFT;
    word |= member_kind_code(decl.member_kind) << flags::MEMBER_KIND_SHIFT;
    if decl.is_operator {
        word |= flags::IS_OPERATOR;
    }
    if decl.is_infix {
        word |= flags::IS_INFIX;
    }
    if decl.is_inline {
        word |= flags::IS_INLINE;
    }
    if decl.is_tailrec {
        word |= flags::IS_TAILREC;
    }
    if decl.is_external {
        word |= flags::IS_EXTERNAL;
    }
    if decl.is_suspend {
        word |= flags::IS_SUSPEND;
    }
    if decl.is_expect {
        word |= flags::IS_EXPECT;
    }
    word
}

/// Pack the flag word of a property record
pub fn property_flags(decl: &PropertyDecl) -> u32 {
    let mut word = 0;
    if decl.has_annotations {
        word |= flags::HAS_ANNOTATIONS;
    }
    word |= visibility_code(decl.visibility) << flags::VISIBILITY_SHIFT;
    word |= modality_code(decl.modality) << flags::MODALITY_SHIFT;
    word |= member_kind_code(decl.member_kind) << flags::MEMBER_KIND_SHIFT;
    if decl.is_var {
        word |= flags::IS_VAR;
    }
    if decl.is_delegated {
        word |= flags::IS_DELEGATED;
    }
    if decl.getter.is_some() {
        word |= flags::HAS_GETTER;
    }
    if decl.setter.is_some() {
        word |= flags::HAS_SETTER;
    }
    if decl.field.is_some() {
        word |= flags::HAS_BACKING_FIELD;
    }
    word
}

/// Pack the flag word of a class record
pub fn class_flags(decl: &ClassDecl) -> u32 {
    let mut word = 0;
    if decl.has_annotations {
        word |= flags::HAS_ANNOTATIONS;
    }
    word |= visibility_code(decl.visibility) << flags::VISIBILITY_SHIFT;
    word |= modality_code(decl.modality) << flags::MODALITY_SHIFT;
    word |= class_kind_code(decl.class_kind) << flags::CLASS_KIND_SHIFT;
    if decl.is_external {
        word |= flags::IS_EXTERNAL;
    }
    if decl.is_expect {
        word |= flags::IS_EXPECT;
    }
    word
}

/// Pack the flag word of a constructor record
pub fn constructor_flags(decl: &ConstructorDecl) -> u32 {
    let mut word = visibility_code(decl.visibility) << flags::VISIBILITY_SHIFT;
    if decl.is_primary {
        word |= flags::IS_PRIMARY;
    }
    if decl.delegate.is_some() {
        word |= flags::IS_DELEGATING;
    }
    word
}

/// Pack the flag word of a value-parameter record
pub fn value_parameter_flags(decl: &ValueParameterDecl) -> u32 {
    let mut word = 0;
    if decl.has_default {
        word |= flags::HAS_DEFAULT;
    }
    if decl.is_vararg {
        word |= flags::IS_VARARG;
    }
    if decl.is_crossinline {
        word |= flags::IS_CROSSINLINE;
    }
    if decl.is_noinline {
        word |= flags::IS_NOINLINE;
    }
    word
}

const TYPE_REF_INLINE: u8 = 0;
const TYPE_REF_INDEXED: u8 = 1;

const TYPE_CLASS: u8 = 0;
const TYPE_ARRAY: u8 = 1;
const TYPE_PARAMETER: u8 = 2;
const TYPE_FUNCTION: u8 = 3;
const TYPE_ERROR: u8 = 4;

const EFFECT_RETURNS_NOT_NULL: u8 = 0;
const EFFECT_CALLS_IN_PLACE: u8 = 1;

/// Reference to a type: either a literal record or an index into the
/// enclosing scope's type table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    /// Literal embedded type
    Inline(Box<TypeRecord>),
    /// Index into the type table
    Indexed(u32),
}

impl TypeRef {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        match self {
            TypeRef::Inline(record) => {
                writer.emit_u8(TYPE_REF_INLINE);
                record.encode(writer);
            }
            TypeRef::Indexed(id) => {
                writer.emit_u8(TYPE_REF_INDEXED);
                writer.emit_u32(*id);
            }
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let offset = reader.position();
        match reader.read_u8()? {
            TYPE_REF_INLINE => Ok(TypeRef::Inline(Box::new(TypeRecord::decode(reader)?))),
            TYPE_REF_INDEXED => Ok(TypeRef::Indexed(reader.read_u32()?)),
            tag => Err(DecodeError::InvalidTag(tag, offset)),
        }
    }
}

/// An encoded type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRecord {
    /// Named class reference
    Class {
        /// String-table index of the class name
        name: u32,
        /// Type arguments
        args: Vec<TypeRef>,
    },
    /// Array type
    Array {
        /// Element type
        element: Box<TypeRef>,
    },
    /// Type-parameter reference
    Parameter {
        /// Interner id of the type parameter
        id: u32,
    },
    /// Function type
    Function {
        /// Parameter types
        params: Vec<TypeRef>,
        /// Return type
        ret: Box<TypeRef>,
        /// Suspend-marked
        is_suspend: bool,
    },
    /// Upstream error placeholder
    Error,
}

impl TypeRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        match self {
            TypeRecord::Class { name, args } => {
                writer.emit_u8(TYPE_CLASS);
                writer.emit_u32(*name);
                writer.emit_u32(args.len() as u32);
                for arg in args {
                    arg.encode(writer);
                }
            }
            TypeRecord::Array { element } => {
                writer.emit_u8(TYPE_ARRAY);
                element.encode(writer);
            }
            TypeRecord::Parameter { id } => {
                writer.emit_u8(TYPE_PARAMETER);
                writer.emit_u32(*id);
            }
            TypeRecord::Function {
                params,
                ret,
                is_suspend,
            } => {
                writer.emit_u8(TYPE_FUNCTION);
                writer.emit_u32(params.len() as u32);
                for param in params {
                    param.encode(writer);
                }
                ret.encode(writer);
                writer.emit_bool(*is_suspend);
            }
            TypeRecord::Error => writer.emit_u8(TYPE_ERROR),
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let offset = reader.position();
        match reader.read_u8()? {
            TYPE_CLASS => {
                let name = reader.read_u32()?;
                let count = reader.read_u32()? as usize;
                let mut args = Vec::with_capacity(count);
                for _ in 0..count {
                    args.push(TypeRef::decode(reader)?);
                }
                Ok(TypeRecord::Class { name, args })
            }
            TYPE_ARRAY => Ok(TypeRecord::Array {
                element: Box::new(TypeRef::decode(reader)?),
            }),
            TYPE_PARAMETER => Ok(TypeRecord::Parameter {
                id: reader.read_u32()?,
            }),
            TYPE_FUNCTION => {
                let count = reader.read_u32()? as usize;
                let mut params = Vec::with_capacity(count);
                for _ in 0..count {
                    params.push(TypeRef::decode(reader)?);
                }
                let ret = Box::new(TypeRef::decode(reader)?);
                let is_suspend = reader.read_bool()?;
                Ok(TypeRecord::Function {
                    params,
                    ret,
                    is_suspend,
                })
            }
            TYPE_ERROR => Ok(TypeRecord::Error),
            tag => Err(DecodeError::InvalidTag(tag, offset)),
        }
    }
}

/// Literal type table embedded by the scope that owns it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeTableRecord {
    /// Interned types, in id order
    pub types: Vec<TypeRecord>,
}

impl TypeTableRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.types.len() as u32);
        for ty in &self.types {
            ty.encode(writer);
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read_u32()? as usize;
        let mut types = Vec::with_capacity(count);
        for _ in 0..count {
            types.push(TypeRecord::decode(reader)?);
        }
        Ok(Self { types })
    }
}

/// An encoded type parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParameterRecord {
    /// String-table index of the parameter name
    pub name: u32,
    /// Interner id shared across the serializer chain
    pub id: u32,
    /// Position in the owner's parameter list
    pub index: u32,
    /// Variance code
    pub variance: u8,
    /// `reified` modifier
    pub is_reified: bool,
    /// Upper bounds
    pub bounds: Vec<TypeRef>,
}

impl TypeParameterRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.name);
        writer.emit_u32(self.id);
        writer.emit_u32(self.index);
        writer.emit_u8(self.variance);
        writer.emit_bool(self.is_reified);
        writer.emit_u32(self.bounds.len() as u32);
        for bound in &self.bounds {
            bound.encode(writer);
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let name = reader.read_u32()?;
        let id = reader.read_u32()?;
        let index = reader.read_u32()?;
        let variance = reader.read_u8()?;
        let is_reified = reader.read_bool()?;
        let count = reader.read_u32()? as usize;
        let mut bounds = Vec::with_capacity(count);
        for _ in 0..count {
            bounds.push(TypeRef::decode(reader)?);
        }
        Ok(Self {
            name,
            id,
            index,
            variance,
            is_reified,
            bounds,
        })
    }
}

/// An encoded value parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueParameterRecord {
    /// Packed flags
    pub flags: u32,
    /// String-table index of the parameter name
    pub name: u32,
    /// Parameter type
    pub ty: TypeRef,
}

impl ValueParameterRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.flags);
        writer.emit_u32(self.name);
        self.ty.encode(writer);
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            flags: reader.read_u32()?,
            name: reader.read_u32()?,
            ty: TypeRef::decode(reader)?,
        })
    }
}

/// Kind of toolchain capability a version requirement gates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionKind {
    /// Minimum language version
    LanguageVersion,
    /// Minimum compiler version
    CompilerVersion,
    /// Minimum API version
    ApiVersion,
}

/// Marker gating a declaration on a minimum toolchain capability
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRequirement {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Patch version
    pub patch: u16,
    /// Gated capability kind
    pub kind: VersionKind,
    /// Optional human-readable message
    pub message: Option<String>,
}

impl VersionRequirement {
    /// The synthesized requirement for suspend-signature functions:
    /// readers older than language version 1.4 must reject rather than
    /// misinterpret the encoding.
    pub fn suspend_functions() -> Self {
        Self {
            major: 1,
            minor: 4,
            patch: 0,
            kind: VersionKind::LanguageVersion,
            message: None,
        }
    }

    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u16(self.major);
        writer.emit_u16(self.minor);
        writer.emit_u16(self.patch);
        writer.emit_u8(match self.kind {
            VersionKind::LanguageVersion => 0,
            VersionKind::CompilerVersion => 1,
            VersionKind::ApiVersion => 2,
        });
        match &self.message {
            Some(message) => {
                writer.emit_bool(true);
                writer.emit_string(message);
            }
            None => writer.emit_bool(false),
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let major = reader.read_u16()?;
        let minor = reader.read_u16()?;
        let patch = reader.read_u16()?;
        let offset = reader.position();
        let kind = match reader.read_u8()? {
            0 => VersionKind::LanguageVersion,
            1 => VersionKind::CompilerVersion,
            2 => VersionKind::ApiVersion,
            tag => return Err(DecodeError::InvalidTag(tag, offset)),
        };
        let message = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };
        Ok(Self {
            major,
            minor,
            patch,
            kind,
            message,
        })
    }
}

/// A single encoded contract effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectRecord {
    /// The function returns a non-null value
    ReturnsNotNull,
    /// A functional parameter is invoked in place
    CallsInPlace {
        /// Index of the value parameter
        parameter: u32,
        /// Invocation-count code
        invocation: u8,
    },
}

/// Encoded contract information
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Declared effects, in source order
    pub effects: Vec<EffectRecord>,
}

impl ContractRecord {
    /// Build the record for contract information on a declaration
    pub fn from_contract(contract: &Contract) -> Self {
        let effects = contract
            .effects
            .iter()
            .map(|effect| match effect {
                ContractEffect::ReturnsNotNull => EffectRecord::ReturnsNotNull,
                ContractEffect::CallsInPlace { parameter, kind } => EffectRecord::CallsInPlace {
                    parameter: *parameter,
                    invocation: invocation_code(*kind),
                },
            })
            .collect();
        Self { effects }
    }

    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.effects.len() as u32);
        for effect in &self.effects {
            match effect {
                EffectRecord::ReturnsNotNull => writer.emit_u8(EFFECT_RETURNS_NOT_NULL),
                EffectRecord::CallsInPlace {
                    parameter,
                    invocation,
                } => {
                    writer.emit_u8(EFFECT_CALLS_IN_PLACE);
                    writer.emit_u32(*parameter);
                    writer.emit_u8(*invocation);
                }
            }
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read_u32()? as usize;
        let mut effects = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = reader.position();
            match reader.read_u8()? {
                EFFECT_RETURNS_NOT_NULL => effects.push(EffectRecord::ReturnsNotNull),
                EFFECT_CALLS_IN_PLACE => effects.push(EffectRecord::CallsInPlace {
                    parameter: reader.read_u32()?,
                    invocation: reader.read_u8()?,
                }),
                tag => return Err(DecodeError::InvalidTag(tag, offset)),
            }
        }
        Ok(Self { effects })
    }
}

fn encode_opt_type_ref(value: &Option<TypeRef>, writer: &mut MetadataWriter) {
    match value {
        Some(ty) => {
            writer.emit_bool(true);
            ty.encode(writer);
        }
        None => writer.emit_bool(false),
    }
}

fn decode_opt_type_ref(reader: &mut MetadataReader<'_>) -> Result<Option<TypeRef>, DecodeError> {
    if reader.read_bool()? {
        Ok(Some(TypeRef::decode(reader)?))
    } else {
        Ok(None)
    }
}

fn encode_opt_bytes(value: &Option<Vec<u8>>, writer: &mut MetadataWriter) {
    match value {
        Some(bytes) => {
            writer.emit_bool(true);
            writer.emit_bytes(bytes);
        }
        None => writer.emit_bool(false),
    }
}

fn decode_opt_bytes(reader: &mut MetadataReader<'_>) -> Result<Option<Vec<u8>>, DecodeError> {
    if reader.read_bool()? {
        Ok(Some(reader.read_len_bytes()?))
    } else {
        Ok(None)
    }
}

/// An encoded function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Packed flags
    pub flags: u32,
    /// String-table index of the function name
    pub name: u32,
    /// Declared type parameters
    pub type_params: Vec<TypeParameterRecord>,
    /// Extension receiver type, if any
    pub receiver: Option<TypeRef>,
    /// Value parameters
    pub value_params: Vec<ValueParameterRecord>,
    /// Return type
    pub return_ty: TypeRef,
    /// Literal type table, present when this function owns its scope
    pub type_table: Option<TypeTableRecord>,
    /// Version-requirement table ids
    pub version_requirements: Vec<u32>,
    /// Contract information, if declared
    pub contract: Option<ContractRecord>,
    /// Embedded serialized body, if the extension requested one
    pub ir_body: Option<Vec<u8>>,
}

impl FunctionRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.flags);
        writer.emit_u32(self.name);
        writer.emit_u32(self.type_params.len() as u32);
        for param in &self.type_params {
            param.encode(writer);
        }
        encode_opt_type_ref(&self.receiver, writer);
        writer.emit_u32(self.value_params.len() as u32);
        for param in &self.value_params {
            param.encode(writer);
        }
        self.return_ty.encode(writer);
        match &self.type_table {
            Some(table) => {
                writer.emit_bool(true);
                table.encode(writer);
            }
            None => writer.emit_bool(false),
        }
        writer.emit_u32(self.version_requirements.len() as u32);
        for id in &self.version_requirements {
            writer.emit_u32(*id);
        }
        match &self.contract {
            Some(contract) => {
                writer.emit_bool(true);
                contract.encode(writer);
            }
            None => writer.emit_bool(false),
        }
        encode_opt_bytes(&self.ir_body, writer);
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let flags = reader.read_u32()?;
        let name = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        let mut type_params = Vec::with_capacity(count);
        for _ in 0..count {
            type_params.push(TypeParameterRecord::decode(reader)?);
        }
        let receiver = decode_opt_type_ref(reader)?;
        let count = reader.read_u32()? as usize;
        let mut value_params = Vec::with_capacity(count);
        for _ in 0..count {
            value_params.push(ValueParameterRecord::decode(reader)?);
        }
        let return_ty = TypeRef::decode(reader)?;
        let type_table = if reader.read_bool()? {
            Some(TypeTableRecord::decode(reader)?)
        } else {
            None
        };
        let count = reader.read_u32()? as usize;
        let mut version_requirements = Vec::with_capacity(count);
        for _ in 0..count {
            version_requirements.push(reader.read_u32()?);
        }
        let contract = if reader.read_bool()? {
            Some(ContractRecord::decode(reader)?)
        } else {
            None
        };
        let ir_body = decode_opt_bytes(reader)?;
        Ok(Self {
            flags,
            name,
            type_params,
            receiver,
            value_params,
            return_ty,
            type_table,
            version_requirements,
            contract,
            ir_body,
        })
    }
}

/// An encoded property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Packed flags
    pub flags: u32,
    /// String-table index of the property name
    pub name: u32,
    /// Property type
    pub ty: TypeRef,
    /// Getter flag word, when a getter exists
    pub getter_flags: Option<u32>,
    /// Setter flag word, when a setter exists
    pub setter_flags: Option<u32>,
    /// Embedded getter body, if the extension requested one
    pub getter_ir: Option<Vec<u8>>,
    /// Embedded setter body, if the extension requested one
    pub setter_ir: Option<Vec<u8>>,
    /// Version-requirement table ids
    pub version_requirements: Vec<u32>,
}

impl PropertyRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.flags);
        writer.emit_u32(self.name);
        self.ty.encode(writer);
        for accessor in [&self.getter_flags, &self.setter_flags] {
            match accessor {
                Some(word) => {
                    writer.emit_bool(true);
                    writer.emit_u32(*word);
                }
                None => writer.emit_bool(false),
            }
        }
        encode_opt_bytes(&self.getter_ir, writer);
        encode_opt_bytes(&self.setter_ir, writer);
        writer.emit_u32(self.version_requirements.len() as u32);
        for id in &self.version_requirements {
            writer.emit_u32(*id);
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let flags = reader.read_u32()?;
        let name = reader.read_u32()?;
        let ty = TypeRef::decode(reader)?;
        let getter_flags = if reader.read_bool()? {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let setter_flags = if reader.read_bool()? {
            Some(reader.read_u32()?)
        } else {
            None
        };
        let getter_ir = decode_opt_bytes(reader)?;
        let setter_ir = decode_opt_bytes(reader)?;
        let count = reader.read_u32()? as usize;
        let mut version_requirements = Vec::with_capacity(count);
        for _ in 0..count {
            version_requirements.push(reader.read_u32()?);
        }
        Ok(Self {
            flags,
            name,
            ty,
            getter_flags,
            setter_flags,
            getter_ir,
            setter_ir,
            version_requirements,
        })
    }
}

/// An encoded constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorRecord {
    /// Packed flags
    pub flags: u32,
    /// Value parameters
    pub value_params: Vec<ValueParameterRecord>,
    /// Version-requirement table ids
    pub version_requirements: Vec<u32>,
    /// Embedded serialized body, if the extension requested one
    pub ir_body: Option<Vec<u8>>,
}

impl ConstructorRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.flags);
        writer.emit_u32(self.value_params.len() as u32);
        for param in &self.value_params {
            param.encode(writer);
        }
        writer.emit_u32(self.version_requirements.len() as u32);
        for id in &self.version_requirements {
            writer.emit_u32(*id);
        }
        encode_opt_bytes(&self.ir_body, writer);
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let flags = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        let mut value_params = Vec::with_capacity(count);
        for _ in 0..count {
            value_params.push(ValueParameterRecord::decode(reader)?);
        }
        let count = reader.read_u32()? as usize;
        let mut version_requirements = Vec::with_capacity(count);
        for _ in 0..count {
            version_requirements.push(reader.read_u32()?);
        }
        let ir_body = decode_opt_bytes(reader)?;
        Ok(Self {
            flags,
            value_params,
            version_requirements,
            ir_body,
        })
    }
}

/// An encoded class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Packed flags
    pub flags: u32,
    /// String-table index of the class name
    pub name: u32,
    /// Declared type parameters
    pub type_params: Vec<TypeParameterRecord>,
    /// Supertypes
    pub supertypes: Vec<TypeRef>,
    /// Constructors
    pub constructors: Vec<ConstructorRecord>,
    /// Member functions
    pub functions: Vec<FunctionRecord>,
    /// Member properties, including backend-synthesized ones
    pub properties: Vec<PropertyRecord>,
    /// Enum entries as string-table indices, in member order
    pub enum_entries: Vec<u32>,
    /// Nested classes
    pub nested_classes: Vec<ClassRecord>,
    /// Literal type table for this class scope
    pub type_table: Option<TypeTableRecord>,
    /// Version-requirement table for this class scope, in id order
    pub version_requirement_table: Vec<VersionRequirement>,
}

impl ClassRecord {
    /// Encode to binary
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.flags);
        writer.emit_u32(self.name);
        writer.emit_u32(self.type_params.len() as u32);
        for param in &self.type_params {
            param.encode(writer);
        }
        writer.emit_u32(self.supertypes.len() as u32);
        for supertype in &self.supertypes {
            supertype.encode(writer);
        }
        writer.emit_u32(self.constructors.len() as u32);
        for constructor in &self.constructors {
            constructor.encode(writer);
        }
        writer.emit_u32(self.functions.len() as u32);
        for function in &self.functions {
            function.encode(writer);
        }
        writer.emit_u32(self.properties.len() as u32);
        for property in &self.properties {
            property.encode(writer);
        }
        writer.emit_u32(self.enum_entries.len() as u32);
        for entry in &self.enum_entries {
            writer.emit_u32(*entry);
        }
        writer.emit_u32(self.nested_classes.len() as u32);
        for nested in &self.nested_classes {
            nested.encode(writer);
        }
        match &self.type_table {
            Some(table) => {
                writer.emit_bool(true);
                table.encode(writer);
            }
            None => writer.emit_bool(false),
        }
        writer.emit_u32(self.version_requirement_table.len() as u32);
        for requirement in &self.version_requirement_table {
            requirement.encode(writer);
        }
    }

    /// Decode from binary
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let flags = reader.read_u32()?;
        let name = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        let mut type_params = Vec::with_capacity(count);
        for _ in 0..count {
            type_params.push(TypeParameterRecord::decode(reader)?);
        }
        let count = reader.read_u32()? as usize;
        let mut supertypes = Vec::with_capacity(count);
        for _ in 0..count {
            supertypes.push(TypeRef::decode(reader)?);
        }
        let count = reader.read_u32()? as usize;
        let mut constructors = Vec::with_capacity(count);
        for _ in 0..count {
            constructors.push(ConstructorRecord::decode(reader)?);
        }
        let count = reader.read_u32()? as usize;
        let mut functions = Vec::with_capacity(count);
        for _ in 0..count {
            functions.push(FunctionRecord::decode(reader)?);
        }
        let count = reader.read_u32()? as usize;
        let mut properties = Vec::with_capacity(count);
        for _ in 0..count {
            properties.push(PropertyRecord::decode(reader)?);
        }
        let count = reader.read_u32()? as usize;
        let mut enum_entries = Vec::with_capacity(count);
        for _ in 0..count {
            enum_entries.push(reader.read_u32()?);
        }
        let count = reader.read_u32()? as usize;
        let mut nested_classes = Vec::with_capacity(count);
        for _ in 0..count {
            nested_classes.push(ClassRecord::decode(reader)?);
        }
        let type_table = if reader.read_bool()? {
            Some(TypeTableRecord::decode(reader)?)
        } else {
            None
        };
        let count = reader.read_u32()? as usize;
        let mut version_requirement_table = Vec::with_capacity(count);
        for _ in 0..count {
            version_requirement_table.push(VersionRequirement::decode(reader)?);
        }
        Ok(Self {
            flags,
            name,
            type_params,
            supertypes,
            constructors,
            functions,
            properties,
            enum_entries,
            nested_classes,
            type_table,
            version_requirement_table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_record_round_trip() {
        let ty = TypeRecord::Function {
            params: vec![TypeRef::Indexed(3), TypeRef::Inline(Box::new(TypeRecord::Error))],
            ret: Box::new(TypeRef::Inline(Box::new(TypeRecord::Array {
                element: Box::new(TypeRef::Indexed(0)),
            }))),
            is_suspend: true,
        };

        let mut writer = MetadataWriter::new();
        ty.encode(&mut writer);
        let bytes = writer.into_bytes();
        let decoded = TypeRecord::decode(&mut MetadataReader::new(&bytes)).unwrap();
        assert_eq!(decoded, ty);
    }

    #[test]
    fn test_function_record_round_trip() {
        let record = FunctionRecord {
            flags: flags::IS_SUSPEND | flags::IS_INLINE,
            name: 4,
            type_params: vec![TypeParameterRecord {
                name: 5,
                id: 1,
                index: 0,
                variance: variance::OUT,
                is_reified: false,
                bounds: vec![TypeRef::Indexed(2)],
            }],
            receiver: Some(TypeRef::Indexed(7)),
            value_params: vec![ValueParameterRecord {
                flags: flags::HAS_DEFAULT,
                name: 6,
                ty: TypeRef::Indexed(1),
            }],
            return_ty: TypeRef::Indexed(0),
            type_table: Some(TypeTableRecord {
                types: vec![TypeRecord::Parameter { id: 1 }],
            }),
            version_requirements: vec![0],
            contract: Some(ContractRecord {
                effects: vec![EffectRecord::CallsInPlace {
                    parameter: 0,
                    invocation: invocation::EXACTLY_ONCE,
                }],
            }),
            ir_body: Some(vec![0xAB, 0xCD]),
        };

        let mut writer = MetadataWriter::new();
        record.encode(&mut writer);
        let bytes = writer.into_bytes();
        let decoded = FunctionRecord::decode(&mut MetadataReader::new(&bytes)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_version_requirement_round_trip() {
        let requirement = VersionRequirement {
            major: 2,
            minor: 1,
            patch: 3,
            kind: VersionKind::CompilerVersion,
            message: Some("needs experimental backend".to_string()),
        };

        let mut writer = MetadataWriter::new();
        requirement.encode(&mut writer);
        let bytes = writer.into_bytes();
        let decoded = VersionRequirement::decode(&mut MetadataReader::new(&bytes)).unwrap();
        assert_eq!(decoded, requirement);
    }

    #[test]
    fn test_invalid_type_tag_is_rejected() {
        let bytes = [9u8];
        let result = TypeRecord::decode(&mut MetadataReader::new(&bytes));
        assert!(matches!(result, Err(DecodeError::InvalidTag(9, 0))));
    }

    #[test]
    fn test_suspend_functions_requirement_shape() {
        let requirement = VersionRequirement::suspend_functions();
        assert_eq!(requirement.kind, VersionKind::LanguageVersion);
        assert_eq!((requirement.major, requirement.minor), (1, 4));
    }
}
