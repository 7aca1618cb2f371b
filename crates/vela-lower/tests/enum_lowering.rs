//! End-to-end enum lowering tests

use vela_ir::{
    Builtins, ClassBuilder, ClassKind, DeclArena, DeclId, EnumEntryBuilder, MemberKind, Modality,
    Ty, Visibility,
};
use vela_lower::enums::{HOLDER_OBJECT, VALUES_FIELD, VALUES_GETTER};
use vela_lower::{create_lowered_enum, LowerError, SupertypeOverrides};

fn color_enum(arena: &mut DeclArena) -> DeclId {
    let class = ClassBuilder::new("Color", ClassKind::Enum).bind(arena, None);
    for name in ["RED", "GREEN", "BLUE"] {
        let entry = EnumEntryBuilder::new(name).bind(arena, Some(class));
        arena.add_member(class, entry);
    }
    class
}

#[test]
fn test_color_enum_end_to_end() {
    let mut arena = DeclArena::new();
    let builtins = Builtins::install(&mut arena);
    let class = color_enum(&mut arena);

    let lowered = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

    // The accessor takes no parameters and returns Array<Color>
    let getter = arena.function(lowered.values_getter).unwrap();
    assert!(getter.value_params.is_empty());
    assert_eq!(getter.return_ty, Ty::array(Ty::named("Color")));

    // Ordinals follow lexicographic entry order, not declaration order
    assert_eq!(
        lowered.entries,
        vec![
            ("BLUE".to_string(), 0),
            ("GREEN".to_string(), 1),
            ("RED".to_string(), 2),
        ]
    );
}

#[test]
fn test_holder_object_shape() {
    let mut arena = DeclArena::new();
    let builtins = Builtins::install(&mut arena);
    let class = color_enum(&mut arena);

    let lowered = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

    let holder = arena.class(lowered.impl_object).unwrap();
    assert_eq!(holder.class_kind, ClassKind::Object);
    assert_eq!(holder.modality, Modality::Final);
    assert_eq!(holder.visibility, Visibility::Public);
    assert_eq!(holder.supertypes, vec![Ty::named("Any")]);
    assert_eq!(arena.name(lowered.impl_object), HOLDER_OBJECT);

    // Field is private, non-static, typed Array<Color>
    let field = arena.field(lowered.values_field).unwrap();
    assert_eq!(field.visibility, Visibility::Private);
    assert!(!field.is_static);
    assert_eq!(field.ty, Ty::array(Ty::named("Color")));
    assert_eq!(arena.name(lowered.values_field), VALUES_FIELD);
    assert_eq!(arena.name(lowered.values_getter), VALUES_GETTER);
}

#[test]
fn test_member_attachment_order() {
    let mut arena = DeclArena::new();
    let builtins = Builtins::install(&mut arena);
    let class = color_enum(&mut arena);

    let lowered = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();
    let holder = arena.class(lowered.impl_object).unwrap();

    // Field and accessor first, then the fake overrides mandated by Any
    assert_eq!(holder.members[0], lowered.values_field);
    assert_eq!(holder.members[1], lowered.values_getter);
    let override_names: Vec<&str> = holder.members[2..]
        .iter()
        .map(|&member| arena.name(member))
        .collect();
    assert_eq!(override_names, vec!["toString", "hashCode", "equals"]);
    for &member in &holder.members[2..] {
        assert_eq!(
            arena.function(member).unwrap().member_kind,
            MemberKind::FakeOverride
        );
    }

    // Exactly one constructor, delegating to Any's no-argument constructor
    assert_eq!(holder.constructors.len(), 1);
    let ctor = arena.constructor(holder.constructors[0]).unwrap();
    assert_eq!(ctor.delegate, builtins.any_constructor(&arena));
    assert_eq!(ctor.visibility, Visibility::Private);
}

#[test]
fn test_item_getter_is_the_shared_array_access() {
    let mut arena = DeclArena::new();
    let builtins = Builtins::install(&mut arena);
    let class = color_enum(&mut arena);

    let lowered = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class).unwrap();

    // No specialization: the reference is Array.get itself, and its return
    // type is still the array's own type parameter
    assert_eq!(Some(lowered.item_getter), builtins.array_get(&arena));
    let get = arena.function(lowered.item_getter).unwrap();
    assert!(matches!(get.return_ty, Ty::Param(_)));
}

#[test]
fn test_missing_any_constructor_is_fatal() {
    let mut arena = DeclArena::new();
    // A root class without the expected constructor
    let bare_any = ClassBuilder::new("Any", ClassKind::Class)
        .modality(Modality::Open)
        .bind(&mut arena, None);
    let bare_array = ClassBuilder::new("Array", ClassKind::Class).bind(&mut arena, None);
    let builtins = Builtins {
        any_class: bare_any,
        array_class: bare_array,
    };
    let class = color_enum(&mut arena);

    let result = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class);
    assert!(matches!(
        result,
        Err(LowerError::MissingBuiltinConstructor { .. })
    ));
}

#[test]
fn test_missing_array_access_is_fatal() {
    let mut arena = DeclArena::new();
    let installed = Builtins::install(&mut arena);
    // Swap the array class for one without an element access
    let bare_array = ClassBuilder::new("Array", ClassKind::Class).bind(&mut arena, None);
    let builtins = Builtins {
        any_class: installed.any_class,
        array_class: bare_array,
    };
    let class = color_enum(&mut arena);

    let result = create_lowered_enum(&mut arena, &builtins, &SupertypeOverrides, class);
    assert!(matches!(result, Err(LowerError::MissingArrayElementAccess)));
}
