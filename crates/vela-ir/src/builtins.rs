//! Compiler builtin declarations
//!
//! The backend relies on a small set of declarations the surrounding
//! compiler guarantees to exist: the root class `Any` with its no-argument
//! constructor, and the generic `Array<T>` class with its element-access
//! function. `install` allocates the canonical skeleton; the lookup
//! methods locate the pieces by name match and return `None` when the
//! arena does not hold them, which callers treat as a fatal
//! internal-consistency failure.

use crate::build::{
    ClassBuilder, ConstructorBuilder, FunctionBuilder, TypeParameterBuilder, ValueParameterBuilder,
};
use crate::decl::{ClassKind, DeclArena, DeclId, Modality};
use crate::ty::Ty;

/// Name of the root class
pub const ANY: &str = "Any";
/// Name of the generic array class
pub const ARRAY: &str = "Array";
/// Name of the array element-access function
pub const ARRAY_GET: &str = "get";

/// Handles to the installed builtin declarations
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    /// The root class `Any`
    pub any_class: DeclId,
    /// The generic `Array` class
    pub array_class: DeclId,
}

impl Builtins {
    /// Allocate the canonical builtin skeleton into `arena`
    pub fn install(arena: &mut DeclArena) -> Self {
        let any_class = ClassBuilder::new(ANY, ClassKind::Class)
            .modality(Modality::Open)
            .bind(arena, None);

        let any_ctor = ConstructorBuilder::new()
            .primary(true)
            .bind(arena, Some(any_class));
        arena.add_constructor(any_class, any_ctor);

        // Members every class inherits
        let to_string = FunctionBuilder::new("toString", Ty::named("String"))
            .modality(Modality::Open)
            .bind(arena, Some(any_class));
        arena.add_member(any_class, to_string);

        let hash_code = FunctionBuilder::new("hashCode", Ty::named("Int"))
            .modality(Modality::Open)
            .bind(arena, Some(any_class));
        arena.add_member(any_class, hash_code);

        let equals = FunctionBuilder::new("equals", Ty::named("Bool"))
            .modality(Modality::Open)
            .operator(true)
            .bind(arena, Some(any_class));
        let other = ValueParameterBuilder::new("other", Ty::named(ANY)).bind(arena, Some(equals));
        arena.add_value_parameter(equals, other);
        arena.add_member(any_class, equals);

        let array_class = ClassBuilder::new(ARRAY, ClassKind::Class).bind(arena, None);
        let element = TypeParameterBuilder::new("T", 0).bind(arena, Some(array_class));
        arena.add_type_parameter(array_class, element);

        let get = FunctionBuilder::new(ARRAY_GET, Ty::Param(element))
            .operator(true)
            .bind(arena, Some(array_class));
        let index = ValueParameterBuilder::new("index", Ty::named("Int")).bind(arena, Some(get));
        arena.add_value_parameter(get, index);
        arena.add_member(array_class, get);

        Self {
            any_class,
            array_class,
        }
    }

    /// The type of the root class
    pub fn any_ty(&self) -> Ty {
        Ty::named(ANY)
    }

    /// The no-argument constructor of `Any`, located on the class
    pub fn any_constructor(&self, arena: &DeclArena) -> Option<DeclId> {
        let class = arena.class(self.any_class)?;
        class.constructors.iter().copied().find(|&ctor| {
            arena
                .constructor(ctor)
                .is_some_and(|decl| decl.value_params.is_empty())
        })
    }

    /// The element-access function of `Array`, located by name match
    pub fn array_get(&self, arena: &DeclArena) -> Option<DeclId> {
        let class = arena.class(self.array_class)?;
        class
            .members
            .iter()
            .copied()
            .find(|&member| arena.name(member) == ARRAY_GET && arena.function(member).is_some())
    }
}
