//! Enum lowering
//!
//! Rewrites an enum class into the compiler-internal scaffolding its
//! runtime value table needs: a singleton holder object carrying the
//! ordered entry array, an accessor for that array, a name-to-ordinal
//! table, and a reference to the shared array element-access function.
//! The factory builds a fresh subtree on every call; deciding whether an
//! enum was already lowered is the caller's job, as is inserting the new
//! object into the enum class's member list (exactly once).

use crate::error::{LowerError, LowerResult};
use crate::overrides::OverrideSynthesizer;
use vela_ir::builtins::ANY;
use vela_ir::{
    Builtins, ClassBuilder, ClassKind, ConstructorBuilder, DeclArena, DeclId, FieldBuilder,
    FunctionBuilder, MemberKind, Modality, PropertyBuilder, SyntheticPropertyMap, Ty,
    ValueParameterBuilder, Visibility,
};

/// Name of the synthesized holder object
pub const HOLDER_OBJECT: &str = "$Entries";
/// Name of the backing field holding the ordered entry array
pub const VALUES_FIELD: &str = "$values";
/// Name of the accessor returning the entry array
pub const VALUES_GETTER: &str = "values";

/// Result of lowering one enum class
#[derive(Debug)]
pub struct LoweredEnum {
    /// The synthesized singleton holder object
    pub impl_object: DeclId,
    /// Private backing field of type `Array<EnumClass>` on the object
    pub values_field: DeclId,
    /// Public zero-parameter accessor returning the backing field's value
    pub values_getter: DeclId,
    /// Shared `Array.get`; referenced, never copied or specialized here
    pub item_getter: DeclId,
    /// Entry name to ordinal, sorted by name
    pub entries: Vec<(String, u32)>,
}

impl LoweredEnum {
    /// Ordinal of an entry by name
    pub fn ordinal(&self, name: &str) -> Option<u32> {
        self.entries
            .binary_search_by(|(entry, _)| entry.as_str().cmp(name))
            .ok()
            .map(|position| self.entries[position].1)
    }
}

/// Lower one enum class into its holder-object subtree.
///
/// The holder is parented under `enum_class` but NOT inserted into its
/// member list. Attachment order inside the holder is fixed: backing
/// field, accessor, delegating constructor, then synthesized overrides in
/// supertype-declaration order.
pub fn create_lowered_enum(
    arena: &mut DeclArena,
    builtins: &Builtins,
    synthesizer: &dyn OverrideSynthesizer,
    enum_class: DeclId,
) -> LowerResult<LoweredEnum> {
    let class = arena.class(enum_class).ok_or_else(|| LowerError::NotAnEnum {
        name: arena.name(enum_class).to_string(),
    })?;
    if class.class_kind != ClassKind::Enum {
        return Err(LowerError::NotAnEnum {
            name: arena.name(enum_class).to_string(),
        });
    }

    let entry_names: Vec<String> = arena
        .enum_entries(enum_class)
        .into_iter()
        .map(|entry| arena.name(entry).to_string())
        .collect();
    if entry_names.is_empty() {
        return Err(LowerError::EnumWithoutEntries {
            name: arena.name(enum_class).to_string(),
        });
    }

    let any_ctor =
        builtins
            .any_constructor(arena)
            .ok_or_else(|| LowerError::MissingBuiltinConstructor {
                class: ANY.to_string(),
            })?;
    let item_getter = builtins
        .array_get(arena)
        .ok_or(LowerError::MissingArrayElementAccess)?;

    let enum_ty = Ty::named(arena.name(enum_class));
    let values_ty = Ty::array(enum_ty);

    // Singleton holder, parented under the enum class; the caller inserts
    // it into the member list
    let impl_object = ClassBuilder::new(HOLDER_OBJECT, ClassKind::Object)
        .modality(Modality::Final)
        .bind(arena, Some(enum_class));
    arena.add_supertype(impl_object, builtins.any_ty());

    // Backing field for the ordered entry array, left uninitialized;
    // a later pass fills it in
    let values_field = FieldBuilder::new(VALUES_FIELD, values_ty.clone())
        .visibility(Visibility::Private)
        .bind(arena, Some(impl_object));
    arena.add_member(impl_object, values_field);

    let values_getter = FunctionBuilder::new(VALUES_GETTER, values_ty)
        .member_kind(MemberKind::Synthesized)
        .bind(arena, Some(impl_object));
    arena.add_member(impl_object, values_getter);

    // Delegating constructor first, then synthesized overrides
    let constructor = ConstructorBuilder::new()
        .visibility(Visibility::Private)
        .primary(true)
        .delegate(any_ctor)
        .bind(arena, Some(impl_object));
    arena.add_constructor(impl_object, constructor);

    for member in synthesizer.required_overrides(arena, impl_object) {
        let function = FunctionBuilder::new(member.name, member.return_ty)
            .modality(Modality::Open)
            .member_kind(MemberKind::FakeOverride)
            .bind(arena, Some(impl_object));
        for (param_name, param_ty) in member.params {
            let param = ValueParameterBuilder::new(param_name, param_ty)
                .bind(arena, Some(function));
            arena.add_value_parameter(function, param);
        }
        arena.add_member(impl_object, function);
    }

    let mut sorted = entry_names;
    sorted.sort();
    let entries = sorted
        .into_iter()
        .enumerate()
        .map(|(ordinal, name)| (name, ordinal as u32))
        .collect();

    Ok(LoweredEnum {
        impl_object,
        values_field,
        values_getter,
        item_getter,
        entries,
    })
}

/// Create the backend-only property wrapping the lowered values field.
///
/// The frontend never sees this property; it is recorded in the synthetic
/// property map so the metadata serializer can still encode it.
pub fn synthesize_values_property(arena: &mut DeclArena, lowered: &LoweredEnum) -> DeclId {
    let ty = arena
        .field(lowered.values_field)
        .map(|field| field.ty.clone())
        .unwrap_or(Ty::Error);
    let property = PropertyBuilder::new(VALUES_FIELD, ty)
        .visibility(Visibility::Private)
        .member_kind(MemberKind::Synthesized)
        .bind(arena, Some(lowered.impl_object));
    arena.set_backing_field(property, lowered.values_field);
    property
}

/// Record a backend-only property for `class` in the auxiliary map
pub fn record_synthetic_property(
    map: &mut SyntheticPropertyMap,
    class: DeclId,
    property: DeclId,
) {
    map.entry(class).or_default().push(property);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::SupertypeOverrides;
    use vela_ir::EnumEntryBuilder;

    fn enum_class(arena: &mut DeclArena, name: &str, entries: &[&str]) -> DeclId {
        let class = ClassBuilder::new(name, ClassKind::Enum).bind(arena, None);
        for entry_name in entries {
            let entry = EnumEntryBuilder::new(*entry_name).bind(arena, Some(class));
            arena.add_member(class, entry);
        }
        class
    }

    #[test]
    fn test_ordinals_ignore_declaration_order() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = enum_class(&mut arena, "Fruit", &["Banana", "Apple", "Cherry"]);

        let lowered =
            create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

        assert_eq!(
            lowered.entries,
            vec![
                ("Apple".to_string(), 0),
                ("Banana".to_string(), 1),
                ("Cherry".to_string(), 2),
            ]
        );
        assert_eq!(lowered.ordinal("Banana"), Some(1));
        assert_eq!(lowered.ordinal("Durian"), None);
    }

    #[test]
    fn test_ordinals_are_contiguous() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = enum_class(&mut arena, "Weekday", &["Mon", "Fri", "Wed", "Tue", "Thu"]);

        let lowered =
            create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

        let mut ordinals: Vec<u32> = lowered.entries.iter().map(|(_, ordinal)| *ordinal).collect();
        ordinals.sort_unstable();
        assert_eq!(ordinals, (0..5).collect::<Vec<u32>>());
    }

    #[test]
    fn test_no_internal_caching() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = enum_class(&mut arena, "Color", &["RED", "GREEN"]);

        let first =
            create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();
        let second =
            create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

        assert_ne!(first.impl_object, second.impl_object);
        assert_ne!(first.values_field, second.values_field);
        // The shared element access is the same reference in both results
        assert_eq!(first.item_getter, second.item_getter);
    }

    #[test]
    fn test_holder_is_not_inserted_into_the_enum() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = enum_class(&mut arena, "Color", &["RED"]);

        let lowered =
            create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

        assert_eq!(arena.parent(lowered.impl_object), Some(class));
        let members = &arena.class(class).unwrap().members;
        assert!(!members.contains(&lowered.impl_object));
    }

    #[test]
    fn test_rejects_non_enum_class() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = ClassBuilder::new("NotAnEnum", ClassKind::Class).bind(&mut arena, None);

        let result = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class);
        assert!(matches!(result, Err(LowerError::NotAnEnum { .. })));
    }

    #[test]
    fn test_rejects_enum_without_entries() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = ClassBuilder::new("Empty", ClassKind::Enum).bind(&mut arena, None);

        let result = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class);
        assert!(matches!(result, Err(LowerError::EnumWithoutEntries { .. })));
    }

    #[test]
    fn test_synthetic_property_map_recording() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);
        let class = enum_class(&mut arena, "Color", &["RED"]);
        let lowered =
            create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

        let property = synthesize_values_property(&mut arena, &lowered);
        let mut map = SyntheticPropertyMap::default();
        record_synthetic_property(&mut map, class, property);

        assert_eq!(map.get(&class), Some(&vec![property]));
        let decl = arena.property(property).unwrap();
        assert_eq!(decl.field, Some(lowered.values_field));
        assert_eq!(decl.member_kind, MemberKind::Synthesized);
    }
}
