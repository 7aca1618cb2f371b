//! Arena-allocated declaration tree
//!
//! Declarations live in a [`DeclArena`] and refer to each other through
//! [`DeclId`] indices. A declaration's identity (name, parent scope, kind
//! payload) is fixed when it is allocated and never re-bound; only the
//! structural membership lists that are filled in as a scope is populated
//! (members, supertypes, parameters) are mutated afterwards, and always
//! through explicit arena operations.

use crate::ty::Ty;
use rustc_hash::FxHashMap;
use std::fmt;

/// Unique identifier for a declaration in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    /// Index into the arena's backing storage
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Map from a class to properties that exist only in the backend
/// (synthesized by lowering, invisible to the frontend member enumeration).
pub type SyntheticPropertyMap = FxHashMap<DeclId, Vec<DeclId>>;

/// Declaration visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible within the defining module
    Internal,
    /// Visible to subclasses
    Protected,
    /// Visible within the defining scope
    Private,
}

/// Declaration modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    /// Cannot be overridden
    Final,
    /// May be overridden
    Open,
    /// Must be overridden
    Abstract,
}

/// Kind of a class-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Ordinary class
    Class,
    /// Interface
    Interface,
    /// Singleton object
    Object,
    /// Enum class
    Enum,
}

/// How a callable member came to exist on its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Written in source
    Declaration,
    /// Implicitly inherited to satisfy a supertype contract
    FakeOverride,
    /// Produced by delegation
    Delegation,
    /// Produced by a compiler pass
    Synthesized,
}

/// Variance of a type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// Invariant
    Invariant,
    /// Contravariant (`in`)
    In,
    /// Covariant (`out`)
    Out,
}

/// How often a functional parameter is invoked in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    /// Called at most once
    AtMostOnce,
    /// Called exactly once
    ExactlyOnce,
    /// Called at least once
    AtLeastOnce,
}

/// A single contract effect
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractEffect {
    /// The function returns a non-null value
    ReturnsNotNull,
    /// A functional parameter is invoked in place
    CallsInPlace {
        /// Index of the value parameter
        parameter: u32,
        /// Invocation count guarantee
        kind: InvocationKind,
    },
}

/// Contract information attached to a function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Contract {
    /// Declared effects, in source order
    pub effects: Vec<ContractEffect>,
}

/// A class-like declaration
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Class / interface / object / enum
    pub class_kind: ClassKind,
    /// Visibility
    pub visibility: Visibility,
    /// Modality
    pub modality: Modality,
    /// Declared in another language
    pub is_external: bool,
    /// Expect declaration of a multiplatform pair
    pub is_expect: bool,
    /// Carries annotations
    pub has_annotations: bool,
    /// Declared type parameters, in declaration order
    pub type_params: Vec<DeclId>,
    /// Declared supertypes, in declaration order
    pub supertypes: Vec<Ty>,
    /// Member declarations, in attachment order
    pub members: Vec<DeclId>,
    /// Constructors, in attachment order
    pub constructors: Vec<DeclId>,
}

/// A function declaration
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    /// Visibility
    pub visibility: Visibility,
    /// Modality
    pub modality: Modality,
    /// Origin of this member
    pub member_kind: MemberKind,
    /// Carries annotations
    pub has_annotations: bool,
    /// `operator` modifier
    pub is_operator: bool,
    /// `infix` modifier
    pub is_infix: bool,
    /// `inline` modifier
    pub is_inline: bool,
    /// `tailrec` modifier
    pub is_tailrec: bool,
    /// `external` modifier
    pub is_external: bool,
    /// `suspend` modifier
    pub is_suspend: bool,
    /// Expect declaration of a multiplatform pair
    pub is_expect: bool,
    /// Declared type parameters, in declaration order
    pub type_params: Vec<DeclId>,
    /// Value parameters, in declaration order
    pub value_params: Vec<DeclId>,
    /// Extension receiver type, if any
    pub receiver: Option<Ty>,
    /// Return type
    pub return_ty: Ty,
    /// Contract information, if declared
    pub contract: Option<Contract>,
}

/// A property declaration
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    /// Visibility
    pub visibility: Visibility,
    /// Modality
    pub modality: Modality,
    /// Origin of this member
    pub member_kind: MemberKind,
    /// Carries annotations
    pub has_annotations: bool,
    /// Mutable (`var`) property
    pub is_var: bool,
    /// Implemented by delegation
    pub is_delegated: bool,
    /// Property type
    pub ty: Ty,
    /// Getter function, if any
    pub getter: Option<DeclId>,
    /// Setter function, if any
    pub setter: Option<DeclId>,
    /// Backing field, if any
    pub field: Option<DeclId>,
}

/// A constructor declaration
#[derive(Debug, Clone)]
pub struct ConstructorDecl {
    /// Visibility
    pub visibility: Visibility,
    /// Primary constructor of its class
    pub is_primary: bool,
    /// Value parameters, in declaration order
    pub value_params: Vec<DeclId>,
    /// Constructor this one forwards to, if delegating
    pub delegate: Option<DeclId>,
}

/// A backing field declaration
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Field type
    pub ty: Ty,
    /// Visibility
    pub visibility: Visibility,
    /// Static (per-class rather than per-instance) storage
    pub is_static: bool,
}

/// A type-parameter declaration
#[derive(Debug, Clone)]
pub struct TypeParameterDecl {
    /// Position in the owner's type-parameter list
    pub index: u32,
    /// Declared variance
    pub variance: Variance,
    /// Upper bounds
    pub bounds: Vec<Ty>,
    /// `reified` modifier
    pub is_reified: bool,
}

/// A value-parameter declaration
#[derive(Debug, Clone)]
pub struct ValueParameterDecl {
    /// Parameter type
    pub ty: Ty,
    /// Has a default value
    pub has_default: bool,
    /// Vararg parameter
    pub is_vararg: bool,
    /// `crossinline` modifier
    pub is_crossinline: bool,
    /// `noinline` modifier
    pub is_noinline: bool,
}

/// Kind-specific payload of a declaration
#[derive(Debug, Clone)]
pub enum DeclKind {
    /// Class-like declaration
    Class(ClassDecl),
    /// Function
    Function(FunctionDecl),
    /// Property
    Property(PropertyDecl),
    /// Constructor
    Constructor(ConstructorDecl),
    /// Backing field
    Field(FieldDecl),
    /// Type parameter
    TypeParameter(TypeParameterDecl),
    /// Value parameter
    ValueParameter(ValueParameterDecl),
    /// Enum entry
    EnumEntry,
}

/// A declaration: identity plus kind payload, fixed at allocation
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Arena id
    pub id: DeclId,
    /// Simple name
    pub name: String,
    /// Owning scope; assigned once at allocation, never reassigned
    pub parent: Option<DeclId>,
    /// Kind payload
    pub kind: DeclKind,
}

/// Append-only arena of declarations
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Declaration>,
}

impl DeclArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations allocated so far
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// True if nothing has been allocated
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Allocate a declaration. Identity fields are fixed from this point on.
    pub(crate) fn alloc(
        &mut self,
        name: String,
        parent: Option<DeclId>,
        kind: DeclKind,
    ) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(Declaration {
            id,
            name,
            parent,
            kind,
        });
        id
    }

    /// Look up a declaration. Ids are only produced by this arena, so an
    /// out-of-range id is an arena-index bug, not a recoverable condition.
    pub fn get(&self, id: DeclId) -> &Declaration {
        self.decls.get(id.index()).expect("declaration id out of bounds")
    }

    fn get_mut(&mut self, id: DeclId) -> &mut Declaration {
        self.decls
            .get_mut(id.index())
            .expect("declaration id out of bounds")
    }

    /// Simple name of a declaration
    pub fn name(&self, id: DeclId) -> &str {
        &self.get(id).name
    }

    /// Parent scope of a declaration
    pub fn parent(&self, id: DeclId) -> Option<DeclId> {
        self.get(id).parent
    }

    /// Iterate all declarations in allocation order
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    /// Class payload of `id`, if it is a class
    pub fn class(&self, id: DeclId) -> Option<&ClassDecl> {
        match &self.get(id).kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Function payload of `id`, if it is a function
    pub fn function(&self, id: DeclId) -> Option<&FunctionDecl> {
        match &self.get(id).kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Property payload of `id`, if it is a property
    pub fn property(&self, id: DeclId) -> Option<&PropertyDecl> {
        match &self.get(id).kind {
            DeclKind::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Constructor payload of `id`, if it is a constructor
    pub fn constructor(&self, id: DeclId) -> Option<&ConstructorDecl> {
        match &self.get(id).kind {
            DeclKind::Constructor(constructor) => Some(constructor),
            _ => None,
        }
    }

    /// Field payload of `id`, if it is a field
    pub fn field(&self, id: DeclId) -> Option<&FieldDecl> {
        match &self.get(id).kind {
            DeclKind::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Type-parameter payload of `id`, if it is a type parameter
    pub fn type_parameter(&self, id: DeclId) -> Option<&TypeParameterDecl> {
        match &self.get(id).kind {
            DeclKind::TypeParameter(param) => Some(param),
            _ => None,
        }
    }

    /// Value-parameter payload of `id`, if it is a value parameter
    pub fn value_parameter(&self, id: DeclId) -> Option<&ValueParameterDecl> {
        match &self.get(id).kind {
            DeclKind::ValueParameter(param) => Some(param),
            _ => None,
        }
    }

    /// True if `id` is an enum entry
    pub fn is_enum_entry(&self, id: DeclId) -> bool {
        matches!(self.get(id).kind, DeclKind::EnumEntry)
    }

    /// Enum entries of a class, in member order
    pub fn enum_entries(&self, class: DeclId) -> Vec<DeclId> {
        self.class(class)
            .map(|decl| {
                decl.members
                    .iter()
                    .copied()
                    .filter(|&member| self.is_enum_entry(member))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Find a top-level class by name
    pub fn find_top_level_class(&self, name: &str) -> Option<DeclId> {
        self.decls.iter().find_map(|decl| {
            if decl.parent.is_none()
                && decl.name == name
                && matches!(decl.kind, DeclKind::Class(_))
            {
                Some(decl.id)
            } else {
                None
            }
        })
    }

    // ===== Structural mutation =====

    fn class_mut(&mut self, id: DeclId) -> &mut ClassDecl {
        match &mut self.get_mut(id).kind {
            DeclKind::Class(class) => class,
            _ => panic!("{} is not a class", id),
        }
    }

    /// Append a member to a class's member list
    pub fn add_member(&mut self, class: DeclId, member: DeclId) {
        self.class_mut(class).members.push(member);
    }

    /// Append a constructor to a class's constructor list
    pub fn add_constructor(&mut self, class: DeclId, constructor: DeclId) {
        self.class_mut(class).constructors.push(constructor);
    }

    /// Append a supertype to a class's supertype list
    pub fn add_supertype(&mut self, class: DeclId, supertype: Ty) {
        self.class_mut(class).supertypes.push(supertype);
    }

    /// Append a type parameter to a class or function
    pub fn add_type_parameter(&mut self, owner: DeclId, param: DeclId) {
        match &mut self.get_mut(owner).kind {
            DeclKind::Class(class) => class.type_params.push(param),
            DeclKind::Function(function) => function.type_params.push(param),
            _ => panic!("{} cannot declare type parameters", owner),
        }
    }

    /// Append a value parameter to a function or constructor
    pub fn add_value_parameter(&mut self, owner: DeclId, param: DeclId) {
        match &mut self.get_mut(owner).kind {
            DeclKind::Function(function) => function.value_params.push(param),
            DeclKind::Constructor(constructor) => constructor.value_params.push(param),
            _ => panic!("{} cannot declare value parameters", owner),
        }
    }

    fn property_mut(&mut self, id: DeclId) -> &mut PropertyDecl {
        match &mut self.get_mut(id).kind {
            DeclKind::Property(property) => property,
            _ => panic!("{} is not a property", id),
        }
    }

    /// Attach a getter to a property
    pub fn set_getter(&mut self, property: DeclId, getter: DeclId) {
        self.property_mut(property).getter = Some(getter);
    }

    /// Attach a setter to a property
    pub fn set_setter(&mut self, property: DeclId, setter: DeclId) {
        self.property_mut(property).setter = Some(setter);
    }

    /// Attach a backing field to a property
    pub fn set_backing_field(&mut self, property: DeclId, field: DeclId) {
        self.property_mut(property).field = Some(field);
    }
}
