//! Declaration serializer
//!
//! Walks a finalized declaration tree and produces one encoded record per
//! declaration. A serializer instance covers exactly one scope; nested
//! scopes derive child instances that share the session-wide string table
//! and the chain-wide type-parameter interner, while type and
//! version-requirement tables are fresh per class scope. Instances live
//! for one committed encode pass and are discarded afterwards; encoding
//! the same declaration twice across other activity is not guaranteed to
//! produce identical bytes, because every step may intern new values.

use crate::error::{SerializeError, SerializeResult};
use crate::extension::SerializerExtension;
use crate::records::{
    class_flags, constructor_flags, function_flags, property_flags, value_parameter_flags,
    variance_code, ClassRecord, ConstructorRecord, ContractRecord, FunctionRecord, PropertyRecord,
    TypeParameterRecord, TypeRecord, TypeRef, TypeTableRecord, ValueParameterRecord,
    VersionRequirement,
};
use crate::tables::{StringTable, TypeParameterTable, TypeTable, VersionRequirementTable};
use std::cell::RefCell;
use std::rc::Rc;
use vela_ir::{DeclArena, DeclId, DeclKind, FunctionDecl, SyntheticPropertyMap, Ty};

/// Shared state of one serialization session
pub struct SerializerContext<'a> {
    /// The declaration tree being encoded
    pub arena: &'a DeclArena,
    /// Backend-synthesized properties invisible to member enumeration
    pub synthetic_properties: &'a SyntheticPropertyMap,
    /// Encode types as table references (true) or literal records (false)
    pub use_type_table: bool,
    pub(crate) strings: RefCell<StringTable>,
}

impl<'a> SerializerContext<'a> {
    /// Create a session context; type-table-reference mode is the default
    pub fn new(arena: &'a DeclArena, synthetic_properties: &'a SyntheticPropertyMap) -> Self {
        Self {
            arena,
            synthetic_properties,
            use_type_table: true,
            strings: RefCell::new(StringTable::new()),
        }
    }

    /// Switch the session to literal type encoding
    pub fn with_inline_types(mut self) -> Self {
        self.use_type_table = false;
        self
    }

    /// Snapshot the session string table in id order
    pub fn string_list(&self) -> Vec<String> {
        self.strings.borrow().to_vec()
    }
}

fn wrong_kind(arena: &DeclArena, decl: DeclId, expected: &'static str) -> SerializeError {
    SerializeError::WrongKind {
        name: arena.name(decl).to_string(),
        expected,
    }
}

fn containing_class(arena: &DeclArena, decl: DeclId) -> Option<DeclId> {
    let mut current = arena.parent(decl);
    while let Some(id) = current {
        if arena.class(id).is_some() {
            return Some(id);
        }
        current = arena.parent(id);
    }
    None
}

/// Serializer for one declaration scope
pub struct DeclarationSerializer<'a> {
    ctx: &'a SerializerContext<'a>,
    extension: &'a dyn SerializerExtension,
    containing: Option<DeclId>,
    type_parameters: Rc<RefCell<TypeParameterTable>>,
    type_table: Rc<RefCell<TypeTable>>,
    version_requirements: Rc<RefCell<VersionRequirementTable>>,
    embed_type_table: bool,
}

impl<'a> DeclarationSerializer<'a> {
    /// Serializer for the top level of a unit: fresh tables, no containing
    /// declaration, literal type-table embedding disabled
    pub fn top_level(
        ctx: &'a SerializerContext<'a>,
        extension: &'a dyn SerializerExtension,
    ) -> Self {
        Self {
            ctx,
            extension,
            containing: None,
            type_parameters: Rc::new(RefCell::new(TypeParameterTable::new())),
            type_table: Rc::new(RefCell::new(TypeTable::new())),
            version_requirements: Rc::new(RefCell::new(VersionRequirementTable::new())),
            embed_type_table: false,
        }
    }

    /// Serializer for a class scope.
    ///
    /// The containing chain is resolved first (top-level if none), so ids
    /// for outer type parameters are assigned strictly before this class's
    /// own parameters are interned into the shared table. The type table
    /// and version-requirement table are fresh per class scope.
    pub fn for_class(
        ctx: &'a SerializerContext<'a>,
        class: DeclId,
        extension: &'a dyn SerializerExtension,
    ) -> SerializeResult<Self> {
        let outer = match containing_class(ctx.arena, class) {
            Some(container) => Self::for_class(ctx, container, extension)?,
            None => Self::top_level(ctx, extension),
        };
        outer.class_scope(class)
    }

    /// Class scope derived from this (live) serializer: shares the
    /// type-parameter interner of the chain, owns fresh type and
    /// version-requirement tables, and interns the class's own type
    /// parameters after every outer id has been assigned
    fn class_scope(&self, class: DeclId) -> SerializeResult<Self> {
        let decl = self
            .ctx
            .arena
            .class(class)
            .ok_or_else(|| wrong_kind(self.ctx.arena, class, "class"))?;
        let serializer = Self {
            ctx: self.ctx,
            extension: self.extension,
            containing: Some(class),
            type_parameters: self.type_parameters.clone(),
            type_table: Rc::new(RefCell::new(TypeTable::new())),
            version_requirements: Rc::new(RefCell::new(VersionRequirementTable::new())),
            embed_type_table: false,
        };
        serializer.intern_type_parameters(&decl.type_params);
        Ok(serializer)
    }

    /// Derived scope for a member declaration; shares every table
    pub fn child(&self, decl: DeclId) -> Self {
        Self {
            ctx: self.ctx,
            extension: self.extension,
            containing: Some(decl),
            type_parameters: self.type_parameters.clone(),
            type_table: self.type_table.clone(),
            version_requirements: self.version_requirements.clone(),
            embed_type_table: self.embed_type_table,
        }
    }

    /// Freshly derived scope for an embedded body: shares the string table
    /// and type-parameter interner, owns its tables, and embeds its type
    /// table literally
    pub fn body(&self, decl: DeclId) -> Self {
        Self {
            ctx: self.ctx,
            extension: self.extension,
            containing: Some(decl),
            type_parameters: self.type_parameters.clone(),
            type_table: Rc::new(RefCell::new(TypeTable::new())),
            version_requirements: Rc::new(RefCell::new(VersionRequirementTable::new())),
            embed_type_table: true,
        }
    }

    /// The declaration this serializer was derived for
    pub fn containing(&self) -> Option<DeclId> {
        self.containing
    }

    /// Intern `name` into the session string table
    pub fn name_index(&self, name: &str) -> u32 {
        self.ctx.strings.borrow_mut().intern(name.to_string())
    }

    /// Id of a type parameter if the chain has interned it
    pub fn type_parameter_id(&self, decl: DeclId) -> Option<u32> {
        self.type_parameters.borrow().id_of(&decl)
    }

    /// Intern a requirement into this scope's table, returning its id
    pub fn require_version(&self, requirement: VersionRequirement) -> u32 {
        self.version_requirements.borrow_mut().intern(requirement)
    }

    /// Snapshot this scope's version-requirement table in id order
    pub fn version_requirement_list(&self) -> Vec<VersionRequirement> {
        self.version_requirements.borrow().to_vec()
    }

    fn intern_type_parameters(&self, params: &[DeclId]) {
        let mut table = self.type_parameters.borrow_mut();
        for &param in params {
            table.intern(param);
        }
    }

    /// Encode a type reference: a table index in type-table mode, a
    /// literal record otherwise
    pub fn type_ref(&self, ty: &Ty) -> TypeRef {
        if self.ctx.use_type_table {
            TypeRef::Indexed(self.type_table.borrow_mut().intern(ty.clone()))
        } else {
            TypeRef::Inline(Box::new(self.type_record(ty)))
        }
    }

    /// Encode a type as a literal record
    pub fn type_record(&self, ty: &Ty) -> TypeRecord {
        match ty {
            Ty::Class { name, args } => TypeRecord::Class {
                name: self.name_index(name),
                args: args.iter().map(|arg| self.type_ref(arg)).collect(),
            },
            Ty::Array(element) => TypeRecord::Array {
                element: Box::new(self.type_ref(element)),
            },
            Ty::Param(decl) => TypeRecord::Parameter {
                id: self.type_parameters.borrow_mut().intern(*decl),
            },
            Ty::Function {
                params,
                ret,
                is_suspend,
            } => TypeRecord::Function {
                params: params.iter().map(|param| self.type_ref(param)).collect(),
                ret: Box::new(self.type_ref(ret)),
                is_suspend: *is_suspend,
            },
            Ty::Error => TypeRecord::Error,
        }
    }

    /// Serialize this scope's type table, or `None` when it is empty.
    /// Converting an entry may intern further types into the same table,
    /// so iteration is by index rather than by iterator.
    pub fn type_table_record(&self) -> Option<TypeTableRecord> {
        if self.type_table.borrow().is_empty() {
            return None;
        }
        let mut types = Vec::new();
        let mut index = 0;
        loop {
            let ty = {
                let table = self.type_table.borrow();
                match table.get(index) {
                    Some(ty) => ty.clone(),
                    None => break,
                }
            };
            types.push(self.type_record(&ty));
            index += 1;
        }
        Some(TypeTableRecord { types })
    }

    /// Encode a type-parameter declaration
    pub fn type_parameter_record(&self, param: DeclId) -> SerializeResult<TypeParameterRecord> {
        let arena = self.ctx.arena;
        let decl = arena
            .type_parameter(param)
            .ok_or_else(|| wrong_kind(arena, param, "type parameter"))?;
        let id = self.type_parameters.borrow_mut().intern(param);
        Ok(TypeParameterRecord {
            name: self.name_index(arena.name(param)),
            id,
            index: decl.index,
            variance: variance_code(decl.variance),
            is_reified: decl.is_reified,
            bounds: decl.bounds.iter().map(|bound| self.type_ref(bound)).collect(),
        })
    }

    /// Encode a value-parameter declaration
    pub fn value_parameter_record(&self, param: DeclId) -> SerializeResult<ValueParameterRecord> {
        let arena = self.ctx.arena;
        let decl = arena
            .value_parameter(param)
            .ok_or_else(|| wrong_kind(arena, param, "value parameter"))?;
        Ok(ValueParameterRecord {
            flags: value_parameter_flags(decl),
            name: self.name_index(arena.name(param)),
            ty: self.type_ref(&decl.ty),
        })
    }

    fn signature_contains_suspend(&self, decl: &FunctionDecl) -> bool {
        let arena = self.ctx.arena;
        decl.is_suspend
            || decl.receiver.as_ref().is_some_and(Ty::contains_suspend)
            || decl.return_ty.contains_suspend()
            || decl.value_params.iter().any(|&param| {
                arena
                    .value_parameter(param)
                    .is_some_and(|value| value.ty.contains_suspend())
            })
    }

    /// Encode a function declaration
    pub fn function_record(&self, function: DeclId) -> SerializeResult<FunctionRecord> {
        let arena = self.ctx.arena;
        let decl = arena
            .function(function)
            .ok_or_else(|| wrong_kind(arena, function, "function"))?;

        // The function's own type parameters live in a child scope
        let scope = self.child(function);
        scope.intern_type_parameters(&decl.type_params);

        let mut type_params = Vec::with_capacity(decl.type_params.len());
        for &param in &decl.type_params {
            type_params.push(scope.type_parameter_record(param)?);
        }
        let receiver = decl.receiver.as_ref().map(|ty| scope.type_ref(ty));
        let mut value_params = Vec::with_capacity(decl.value_params.len());
        for &param in &decl.value_params {
            value_params.push(scope.value_parameter_record(param)?);
        }
        let return_ty = scope.type_ref(&decl.return_ty);

        // The suspend marker is appended whenever the signature carries a
        // suspend-marked type anywhere, in addition to whatever other
        // requirements are present; older readers must reject rather than
        // misinterpret such functions
        let mut version_requirements = Vec::new();
        if scope.signature_contains_suspend(decl) {
            version_requirements
                .push(scope.require_version(VersionRequirement::suspend_functions()));
        }

        let contract = decl.contract.as_ref().map(ContractRecord::from_contract);

        let mut record = FunctionRecord {
            flags: function_flags(decl),
            name: scope.name_index(arena.name(function)),
            type_params,
            receiver,
            value_params,
            return_ty,
            type_table: None,
            version_requirements,
            contract,
            ir_body: None,
        };

        self.extension.extend_function(arena, function, &mut record);

        // Attach the literal table only if this scope owns the embedding,
        // and only after every type of the record has been interned
        if scope.embed_type_table {
            record.type_table = scope.type_table_record();
        }

        if self.extension.needs_serialized_ir(arena, function) {
            let body = self
                .extension
                .serialize_inline_body(arena, function, &scope.body(function));
            self.extension.add_function_ir(&mut record, body);
        }
        Ok(record)
    }

    /// Encode a property declaration
    pub fn property_record(&self, property: DeclId) -> SerializeResult<PropertyRecord> {
        let arena = self.ctx.arena;
        let decl = arena
            .property(property)
            .ok_or_else(|| wrong_kind(arena, property, "property"))?;

        let getter_flags = match decl.getter {
            Some(getter) => Some(function_flags(
                arena
                    .function(getter)
                    .ok_or_else(|| wrong_kind(arena, getter, "function"))?,
            )),
            None => None,
        };
        let setter_flags = match decl.setter {
            Some(setter) => Some(function_flags(
                arena
                    .function(setter)
                    .ok_or_else(|| wrong_kind(arena, setter, "function"))?,
            )),
            None => None,
        };

        let mut record = PropertyRecord {
            flags: property_flags(decl),
            name: self.name_index(arena.name(property)),
            ty: self.type_ref(&decl.ty),
            getter_flags,
            setter_flags,
            getter_ir: None,
            setter_ir: None,
            version_requirements: Vec::new(),
        };

        self.extension.extend_property(arena, property, &mut record);

        // Getter and setter are decided independently; one may embed a
        // body while the other does not
        if let Some(getter) = decl.getter {
            if self.extension.needs_serialized_ir(arena, getter) {
                let body = self
                    .extension
                    .serialize_inline_body(arena, getter, &self.body(getter));
                self.extension.add_getter_ir(&mut record, body);
            }
        }
        if let Some(setter) = decl.setter {
            if self.extension.needs_serialized_ir(arena, setter) {
                let body = self
                    .extension
                    .serialize_inline_body(arena, setter, &self.body(setter));
                self.extension.add_setter_ir(&mut record, body);
            }
        }
        Ok(record)
    }

    /// Encode a constructor declaration
    pub fn constructor_record(&self, constructor: DeclId) -> SerializeResult<ConstructorRecord> {
        let arena = self.ctx.arena;
        let decl = arena
            .constructor(constructor)
            .ok_or_else(|| wrong_kind(arena, constructor, "constructor"))?;

        let mut value_params = Vec::with_capacity(decl.value_params.len());
        for &param in &decl.value_params {
            value_params.push(self.value_parameter_record(param)?);
        }

        let mut record = ConstructorRecord {
            flags: constructor_flags(decl),
            value_params,
            version_requirements: Vec::new(),
            ir_body: None,
        };

        self.extension.extend_constructor(arena, constructor, &mut record);

        if self.extension.needs_serialized_ir(arena, constructor) {
            let body = self
                .extension
                .serialize_inline_body(arena, constructor, &self.body(constructor));
            self.extension.add_constructor_ir(&mut record, body);
        }
        Ok(record)
    }

    /// Encode a class declaration.
    ///
    /// Must be invoked on the serializer created via `for_class` for this
    /// class, so that its type parameters are visible in the shared
    /// interner. Beyond the frontend-visible members, one property record
    /// is appended per entry in the synthetic property map; those would
    /// otherwise be dropped silently.
    pub fn class_record(&self, class: DeclId) -> SerializeResult<ClassRecord> {
        let arena = self.ctx.arena;
        let decl = arena
            .class(class)
            .ok_or_else(|| wrong_kind(arena, class, "class"))?;
        if self.containing != Some(class) {
            return Err(SerializeError::Internal {
                message: format!(
                    "serializer scope mismatch: expected {}",
                    arena.name(class)
                ),
            });
        }

        let mut type_params = Vec::with_capacity(decl.type_params.len());
        for &param in &decl.type_params {
            type_params.push(self.type_parameter_record(param)?);
        }
        let supertypes = decl
            .supertypes
            .iter()
            .map(|supertype| self.type_ref(supertype))
            .collect();
        let mut constructors = Vec::with_capacity(decl.constructors.len());
        for &constructor in &decl.constructors {
            constructors.push(self.constructor_record(constructor)?);
        }

        let mut functions = Vec::new();
        let mut properties = Vec::new();
        let mut enum_entries = Vec::new();
        let mut nested_classes = Vec::new();
        for &member in &decl.members {
            match &arena.get(member).kind {
                DeclKind::Function(_) => functions.push(self.function_record(member)?),
                DeclKind::Property(_) => properties.push(self.property_record(member)?),
                DeclKind::Class(_) => {
                    // Derive from the live chain so ids already assigned to
                    // outer type parameters stay visible to the nested class
                    let nested = self.class_scope(member)?;
                    nested_classes.push(nested.class_record(member)?);
                }
                DeclKind::EnumEntry => enum_entries.push(self.name_index(arena.name(member))),
                // Fields surface through their properties
                _ => {}
            }
        }

        if let Some(synthetic) = self.ctx.synthetic_properties.get(&class) {
            for &property in synthetic {
                properties.push(self.property_record(property)?);
            }
        }

        let mut record = ClassRecord {
            flags: class_flags(decl),
            name: self.name_index(arena.name(class)),
            type_params,
            supertypes,
            constructors,
            functions,
            properties,
            enum_entries,
            nested_classes,
            type_table: None,
            version_requirement_table: Vec::new(),
        };

        self.extension.extend_class(arena, class, &mut record);

        // A class scope always owns its tables
        record.type_table = self.type_table_record();
        record.version_requirement_table = self.version_requirement_list();
        Ok(record)
    }
}
