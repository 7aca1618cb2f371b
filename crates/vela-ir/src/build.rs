//! Bind-once declaration builders
//!
//! Each builder collects the identity and type-system facts of one
//! declaration and is consumed by `bind`, which allocates the declaration
//! into the arena with those facts fixed. Because `bind` takes the builder
//! by value, a declaration can never be re-bound. Binding sets the parent
//! scope but never inserts the new declaration into any membership list;
//! that is always an explicit follow-up step.

use crate::decl::{
    ClassDecl, ClassKind, ConstructorDecl, Contract, DeclArena, DeclId, DeclKind, FieldDecl,
    FunctionDecl, MemberKind, Modality, PropertyDecl, TypeParameterDecl, ValueParameterDecl,
    Variance, Visibility,
};
use crate::ty::Ty;

/// Builder for class-like declarations
pub struct ClassBuilder {
    name: String,
    class_kind: ClassKind,
    visibility: Visibility,
    modality: Modality,
    is_external: bool,
    is_expect: bool,
    has_annotations: bool,
}

impl ClassBuilder {
    /// Start a class with defaults: public, final
    pub fn new(name: impl Into<String>, class_kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            class_kind,
            visibility: Visibility::Public,
            modality: Modality::Final,
            is_external: false,
            is_expect: false,
            has_annotations: false,
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set modality
    pub fn modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Mark as external
    pub fn external(mut self, flag: bool) -> Self {
        self.is_external = flag;
        self
    }

    /// Mark as an expect declaration
    pub fn expect(mut self, flag: bool) -> Self {
        self.is_expect = flag;
        self
    }

    /// Mark as annotated
    pub fn annotations(mut self, flag: bool) -> Self {
        self.has_annotations = flag;
        self
    }

    /// Allocate the class under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            self.name,
            parent,
            DeclKind::Class(ClassDecl {
                class_kind: self.class_kind,
                visibility: self.visibility,
                modality: self.modality,
                is_external: self.is_external,
                is_expect: self.is_expect,
                has_annotations: self.has_annotations,
                type_params: Vec::new(),
                supertypes: Vec::new(),
                members: Vec::new(),
                constructors: Vec::new(),
            }),
        )
    }
}

/// Builder for function declarations
pub struct FunctionBuilder {
    name: String,
    visibility: Visibility,
    modality: Modality,
    member_kind: MemberKind,
    has_annotations: bool,
    is_operator: bool,
    is_infix: bool,
    is_inline: bool,
    is_tailrec: bool,
    is_external: bool,
    is_suspend: bool,
    is_expect: bool,
    receiver: Option<Ty>,
    return_ty: Ty,
    contract: Option<Contract>,
}

impl FunctionBuilder {
    /// Start a function with defaults: public, final, source declaration
    pub fn new(name: impl Into<String>, return_ty: Ty) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            modality: Modality::Final,
            member_kind: MemberKind::Declaration,
            has_annotations: false,
            is_operator: false,
            is_infix: false,
            is_inline: false,
            is_tailrec: false,
            is_external: false,
            is_suspend: false,
            is_expect: false,
            receiver: None,
            return_ty,
            contract: None,
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set modality
    pub fn modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Set the member-kind origin
    pub fn member_kind(mut self, member_kind: MemberKind) -> Self {
        self.member_kind = member_kind;
        self
    }

    /// Mark as annotated
    pub fn annotations(mut self, flag: bool) -> Self {
        self.has_annotations = flag;
        self
    }

    /// Set the `operator` modifier
    pub fn operator(mut self, flag: bool) -> Self {
        self.is_operator = flag;
        self
    }

    /// Set the `infix` modifier
    pub fn infix(mut self, flag: bool) -> Self {
        self.is_infix = flag;
        self
    }

    /// Set the `inline` modifier
    pub fn inline(mut self, flag: bool) -> Self {
        self.is_inline = flag;
        self
    }

    /// Set the `tailrec` modifier
    pub fn tailrec(mut self, flag: bool) -> Self {
        self.is_tailrec = flag;
        self
    }

    /// Set the `external` modifier
    pub fn external(mut self, flag: bool) -> Self {
        self.is_external = flag;
        self
    }

    /// Set the `suspend` modifier
    pub fn suspend(mut self, flag: bool) -> Self {
        self.is_suspend = flag;
        self
    }

    /// Mark as an expect declaration
    pub fn expect(mut self, flag: bool) -> Self {
        self.is_expect = flag;
        self
    }

    /// Set the extension receiver type
    pub fn receiver(mut self, receiver: Ty) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Attach contract information
    pub fn contract(mut self, contract: Contract) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Allocate the function under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            self.name,
            parent,
            DeclKind::Function(FunctionDecl {
                visibility: self.visibility,
                modality: self.modality,
                member_kind: self.member_kind,
                has_annotations: self.has_annotations,
                is_operator: self.is_operator,
                is_infix: self.is_infix,
                is_inline: self.is_inline,
                is_tailrec: self.is_tailrec,
                is_external: self.is_external,
                is_suspend: self.is_suspend,
                is_expect: self.is_expect,
                type_params: Vec::new(),
                value_params: Vec::new(),
                receiver: self.receiver,
                return_ty: self.return_ty,
                contract: self.contract,
            }),
        )
    }
}

/// Builder for property declarations
pub struct PropertyBuilder {
    name: String,
    visibility: Visibility,
    modality: Modality,
    member_kind: MemberKind,
    has_annotations: bool,
    is_var: bool,
    is_delegated: bool,
    ty: Ty,
}

impl PropertyBuilder {
    /// Start a property with defaults: public, final, immutable
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            modality: Modality::Final,
            member_kind: MemberKind::Declaration,
            has_annotations: false,
            is_var: false,
            is_delegated: false,
            ty,
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set modality
    pub fn modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Set the member-kind origin
    pub fn member_kind(mut self, member_kind: MemberKind) -> Self {
        self.member_kind = member_kind;
        self
    }

    /// Mark as annotated
    pub fn annotations(mut self, flag: bool) -> Self {
        self.has_annotations = flag;
        self
    }

    /// Mark as mutable (`var`)
    pub fn mutable(mut self, flag: bool) -> Self {
        self.is_var = flag;
        self
    }

    /// Mark as delegated
    pub fn delegated(mut self, flag: bool) -> Self {
        self.is_delegated = flag;
        self
    }

    /// Allocate the property under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            self.name,
            parent,
            DeclKind::Property(PropertyDecl {
                visibility: self.visibility,
                modality: self.modality,
                member_kind: self.member_kind,
                has_annotations: self.has_annotations,
                is_var: self.is_var,
                is_delegated: self.is_delegated,
                ty: self.ty,
                getter: None,
                setter: None,
                field: None,
            }),
        )
    }
}

/// Builder for constructor declarations
pub struct ConstructorBuilder {
    visibility: Visibility,
    is_primary: bool,
    delegate: Option<DeclId>,
}

impl ConstructorBuilder {
    /// Start a constructor with defaults: public, secondary
    pub fn new() -> Self {
        Self {
            visibility: Visibility::Public,
            is_primary: false,
            delegate: None,
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as the primary constructor
    pub fn primary(mut self, flag: bool) -> Self {
        self.is_primary = flag;
        self
    }

    /// Forward to another constructor
    pub fn delegate(mut self, target: DeclId) -> Self {
        self.delegate = Some(target);
        self
    }

    /// Allocate the constructor under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            "<init>".to_string(),
            parent,
            DeclKind::Constructor(ConstructorDecl {
                visibility: self.visibility,
                is_primary: self.is_primary,
                value_params: Vec::new(),
                delegate: self.delegate,
            }),
        )
    }
}

impl Default for ConstructorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for backing-field declarations
pub struct FieldBuilder {
    name: String,
    ty: Ty,
    visibility: Visibility,
    is_static: bool,
}

impl FieldBuilder {
    /// Start a field with defaults: private, per-instance
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            is_static: false,
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as static
    pub fn static_(mut self, flag: bool) -> Self {
        self.is_static = flag;
        self
    }

    /// Allocate the field under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            self.name,
            parent,
            DeclKind::Field(FieldDecl {
                ty: self.ty,
                visibility: self.visibility,
                is_static: self.is_static,
            }),
        )
    }
}

/// Builder for type-parameter declarations
pub struct TypeParameterBuilder {
    name: String,
    index: u32,
    variance: Variance,
    bounds: Vec<Ty>,
    is_reified: bool,
}

impl TypeParameterBuilder {
    /// Start a type parameter at the given position
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
            variance: Variance::Invariant,
            bounds: Vec::new(),
            is_reified: false,
        }
    }

    /// Set variance
    pub fn variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }

    /// Append an upper bound
    pub fn bound(mut self, bound: Ty) -> Self {
        self.bounds.push(bound);
        self
    }

    /// Mark as reified
    pub fn reified(mut self, flag: bool) -> Self {
        self.is_reified = flag;
        self
    }

    /// Allocate the type parameter under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            self.name,
            parent,
            DeclKind::TypeParameter(TypeParameterDecl {
                index: self.index,
                variance: self.variance,
                bounds: self.bounds,
                is_reified: self.is_reified,
            }),
        )
    }
}

/// Builder for value-parameter declarations
pub struct ValueParameterBuilder {
    name: String,
    ty: Ty,
    has_default: bool,
    is_vararg: bool,
    is_crossinline: bool,
    is_noinline: bool,
}

impl ValueParameterBuilder {
    /// Start a value parameter
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
            is_vararg: false,
            is_crossinline: false,
            is_noinline: false,
        }
    }

    /// Mark as having a default value
    pub fn default_value(mut self, flag: bool) -> Self {
        self.has_default = flag;
        self
    }

    /// Mark as vararg
    pub fn vararg(mut self, flag: bool) -> Self {
        self.is_vararg = flag;
        self
    }

    /// Set the `crossinline` modifier
    pub fn crossinline(mut self, flag: bool) -> Self {
        self.is_crossinline = flag;
        self
    }

    /// Set the `noinline` modifier
    pub fn noinline(mut self, flag: bool) -> Self {
        self.is_noinline = flag;
        self
    }

    /// Allocate the value parameter under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(
            self.name,
            parent,
            DeclKind::ValueParameter(ValueParameterDecl {
                ty: self.ty,
                has_default: self.has_default,
                is_vararg: self.is_vararg,
                is_crossinline: self.is_crossinline,
                is_noinline: self.is_noinline,
            }),
        )
    }
}

/// Builder for enum entries
pub struct EnumEntryBuilder {
    name: String,
}

impl EnumEntryBuilder {
    /// Start an enum entry
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Allocate the entry under `parent`, consuming the builder
    pub fn bind(self, arena: &mut DeclArena, parent: Option<DeclId>) -> DeclId {
        arena.alloc(self.name, parent, DeclKind::EnumEntry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let mut arena = DeclArena::new();
        let class = ClassBuilder::new("Holder", ClassKind::Object).bind(&mut arena, None);
        let decl = arena.class(class).unwrap();

        assert_eq!(decl.visibility, Visibility::Public);
        assert_eq!(decl.modality, Modality::Final);
        assert_eq!(decl.class_kind, ClassKind::Object);
    }

    #[test]
    fn test_constructor_binds_with_init_name() {
        let mut arena = DeclArena::new();
        let class = ClassBuilder::new("Holder", ClassKind::Object).bind(&mut arena, None);
        let ctor = ConstructorBuilder::new()
            .visibility(Visibility::Private)
            .primary(true)
            .bind(&mut arena, Some(class));

        assert_eq!(arena.name(ctor), "<init>");
        assert!(arena.constructor(ctor).unwrap().is_primary);
    }

    #[test]
    fn test_function_flags() {
        let mut arena = DeclArena::new();
        let function = FunctionBuilder::new("await", Ty::named("Unit"))
            .suspend(true)
            .inline(true)
            .member_kind(MemberKind::Synthesized)
            .bind(&mut arena, None);

        let decl = arena.function(function).unwrap();
        assert!(decl.is_suspend);
        assert!(decl.is_inline);
        assert!(!decl.is_operator);
        assert_eq!(decl.member_kind, MemberKind::Synthesized);
    }
}
