//! End-to-end serialization tests

use vela_ir::{
    Builtins, ClassBuilder, ClassKind, DeclArena, DeclId, EnumEntryBuilder, FunctionBuilder,
    MemberKind, PropertyBuilder, SyntheticPropertyMap, Ty, TypeParameterBuilder,
    ValueParameterBuilder, Visibility,
};
use vela_lower::{
    create_lowered_enum, record_synthetic_property, synthesize_values_property, SupertypeOverrides,
};
use vela_metadata::records::flags;
use vela_metadata::{
    serialize_unit, DeclarationSerializer, MetadataUnit, OrdinaryExtension, SerializerContext,
    SerializerExtension, TypeRecord, TypeRef, VersionRequirement,
};

fn lowered_color_module(arena: &mut DeclArena, map: &mut SyntheticPropertyMap) -> DeclId {
    let builtins = Builtins::install(arena);
    let color = ClassBuilder::new("Color", ClassKind::Enum).bind(arena, None);
    for name in ["RED", "GREEN", "BLUE"] {
        let entry = EnumEntryBuilder::new(name).bind(arena, Some(color));
        arena.add_member(color, entry);
    }

    let lowered = create_lowered_enum(arena, &builtins, &SupertypeOverrides, color).unwrap();
    // The orchestrator inserts the holder exactly once
    arena.add_member(color, lowered.impl_object);
    let property = synthesize_values_property(arena, &lowered);
    record_synthetic_property(map, lowered.impl_object, property);
    color
}

#[test]
fn test_outer_type_parameters_intern_before_inner() {
    let mut arena = DeclArena::new();
    let outer = ClassBuilder::new("Outer", ClassKind::Class).bind(&mut arena, None);
    let outer_param = TypeParameterBuilder::new("O", 0).bind(&mut arena, Some(outer));
    arena.add_type_parameter(outer, outer_param);

    let inner = ClassBuilder::new("Inner", ClassKind::Class).bind(&mut arena, Some(outer));
    arena.add_member(outer, inner);
    let inner_param = TypeParameterBuilder::new("I", 0).bind(&mut arena, Some(inner));
    arena.add_type_parameter(inner, inner_param);

    // An inner member referring to the outer class's type parameter
    let function = FunctionBuilder::new("first", Ty::Param(outer_param)).bind(&mut arena, Some(inner));
    arena.add_member(inner, function);

    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic);
    let serializer = DeclarationSerializer::for_class(&ctx, inner, &OrdinaryExtension).unwrap();

    // Outer ids are assigned strictly before inner ones
    assert_eq!(serializer.type_parameter_id(outer_param), Some(0));
    assert_eq!(serializer.type_parameter_id(inner_param), Some(1));

    let record = serializer.class_record(inner).unwrap();
    assert_eq!(record.type_params.len(), 1);
    assert_eq!(record.type_params[0].id, 1);

    // The function's return type resolves through the shared interner to
    // the outer parameter's id
    let table = record.type_table.expect("class scope embeds its type table");
    let TypeRef::Indexed(index) = &record.functions[0].return_ty else {
        panic!("expected a type-table reference");
    };
    assert_eq!(
        table.types[*index as usize],
        TypeRecord::Parameter { id: 0 }
    );
}

#[test]
fn test_shared_table_dedups_structurally_equal_types() {
    let arena = DeclArena::new();
    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic);
    let serializer = DeclarationSerializer::top_level(&ctx, &OrdinaryExtension);

    let first = serializer.type_ref(&Ty::array(Ty::named("Color")));
    let second = serializer.type_ref(&Ty::array(Ty::named("Color")));
    let third = serializer.type_ref(&Ty::named("Color"));

    assert_eq!(first, second);
    assert_ne!(first, third);
    let TypeRef::Indexed(id) = third else {
        panic!("expected a type-table reference");
    };
    assert_eq!(id, 1);
}

#[test]
fn test_suspend_signature_adds_version_requirement() {
    let mut arena = DeclArena::new();
    // Suspend marker hidden inside a parameter's function type
    let launch = FunctionBuilder::new("launch", Ty::named("Unit")).bind(&mut arena, None);
    let block = ValueParameterBuilder::new(
        "block",
        Ty::function(Vec::new(), Ty::named("Unit"), true),
    )
    .bind(&mut arena, Some(launch));
    arena.add_value_parameter(launch, block);

    // Suspend as the function's own modifier
    let pause = FunctionBuilder::new("pause", Ty::named("Unit"))
        .suspend(true)
        .bind(&mut arena, None);

    // No suspend anywhere
    let plain = FunctionBuilder::new("plain", Ty::named("Int")).bind(&mut arena, None);

    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic);
    let unit = serialize_unit(&ctx, "coroutines", &[launch, pause, plain], &OrdinaryExtension)
        .unwrap();

    let requirement = VersionRequirement::suspend_functions();
    for record in &unit.functions[..2] {
        assert_eq!(record.version_requirements.len(), 1);
        let id = record.version_requirements[0] as usize;
        assert_eq!(unit.version_requirements[id], requirement);
    }
    assert!(unit.functions[2].version_requirements.is_empty());
}

#[test]
fn test_synthetic_property_is_encoded() {
    let mut arena = DeclArena::new();
    let mut map = SyntheticPropertyMap::default();
    let color = lowered_color_module(&mut arena, &mut map);

    let ctx = SerializerContext::new(&arena, &map);
    let unit = serialize_unit(&ctx, "colors", &[color], &OrdinaryExtension).unwrap();

    let color_record = &unit.classes[0];
    // Entry names are encoded in member order
    let entry_names: Vec<&str> = color_record
        .enum_entries
        .iter()
        .map(|&index| unit.strings[index as usize].as_str())
        .collect();
    assert_eq!(entry_names, vec!["RED", "GREEN", "BLUE"]);

    // The holder object is nested in the enum and carries exactly one
    // property: the one that exists only through the auxiliary map
    let holder = &color_record.nested_classes[0];
    assert_eq!(holder.properties.len(), 1);
    let values = &holder.properties[0];
    assert_eq!(unit.strings[values.name as usize], "$values");
    assert!(flags::has(values.flags, flags::HAS_BACKING_FIELD));
    assert!(!flags::has(values.flags, flags::IS_VAR));
}

#[test]
fn test_unit_round_trip() {
    let mut arena = DeclArena::new();
    let mut map = SyntheticPropertyMap::default();
    let color = lowered_color_module(&mut arena, &mut map);
    let plain = FunctionBuilder::new("plain", Ty::named("Int")).bind(&mut arena, None);

    let ctx = SerializerContext::new(&arena, &map);
    let unit = serialize_unit(&ctx, "colors", &[color, plain], &OrdinaryExtension).unwrap();

    let bytes = unit.encode();
    let decoded = MetadataUnit::decode(&bytes).unwrap();
    assert_eq!(decoded, unit);
    assert!(decoded.validate().is_ok());
}

/// Embeds bodies for inline functions; payload is the declaration name
struct InlineBodies;

impl SerializerExtension for InlineBodies {
    fn needs_serialized_ir(&self, arena: &DeclArena, decl: DeclId) -> bool {
        arena.function(decl).is_some_and(|function| function.is_inline)
    }

    fn serialize_inline_body(
        &self,
        arena: &DeclArena,
        decl: DeclId,
        body: &DeclarationSerializer<'_>,
    ) -> Vec<u8> {
        // The body scope interns whatever types the body mentions
        if let Some(function) = arena.function(decl) {
            let _ = body.type_ref(&function.return_ty);
        }
        arena.name(decl).as_bytes().to_vec()
    }
}

#[test]
fn test_inline_function_body_embedding() {
    let mut arena = DeclArena::new();
    let fast = FunctionBuilder::new("fast", Ty::named("Int"))
        .inline(true)
        .bind(&mut arena, None);
    let slow = FunctionBuilder::new("slow", Ty::named("Int")).bind(&mut arena, None);

    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic);
    let unit = serialize_unit(&ctx, "inline", &[fast, slow], &InlineBodies).unwrap();

    assert_eq!(unit.functions[0].ir_body.as_deref(), Some(b"fast".as_ref()));
    assert!(unit.functions[1].ir_body.is_none());
    assert!(flags::has(
        unit.flags,
        vela_metadata::unit::flags::HAS_EMBEDDED_IR
    ));
}

#[test]
fn test_accessors_embed_independently() {
    let mut arena = DeclArena::new();
    let class = ClassBuilder::new("Box", ClassKind::Class).bind(&mut arena, None);
    let property = PropertyBuilder::new("size", Ty::named("Int"))
        .mutable(true)
        .bind(&mut arena, Some(class));
    arena.add_member(class, property);

    // Inline getter, ordinary setter
    let getter = FunctionBuilder::new("<get-size>", Ty::named("Int"))
        .inline(true)
        .member_kind(MemberKind::Synthesized)
        .bind(&mut arena, Some(property));
    arena.set_getter(property, getter);
    let setter = FunctionBuilder::new("<set-size>", Ty::named("Unit"))
        .member_kind(MemberKind::Synthesized)
        .bind(&mut arena, Some(property));
    arena.set_setter(property, setter);

    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic);
    let unit = serialize_unit(&ctx, "accessors", &[class], &InlineBodies).unwrap();

    let record = &unit.classes[0].properties[0];
    assert!(flags::has(record.flags, flags::HAS_GETTER));
    assert!(flags::has(record.flags, flags::HAS_SETTER));
    assert_eq!(record.getter_ir.as_deref(), Some(b"<get-size>".as_ref()));
    assert!(record.setter_ir.is_none());
}

#[test]
fn test_inline_type_mode_embeds_literal_types() {
    let mut arena = DeclArena::new();
    let plain = FunctionBuilder::new("plain", Ty::named("Int")).bind(&mut arena, None);

    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic).with_inline_types();
    let unit = serialize_unit(&ctx, "literal", &[plain], &OrdinaryExtension).unwrap();

    assert!(matches!(
        unit.functions[0].return_ty,
        TypeRef::Inline(_)
    ));
    assert!(unit.types.types.is_empty());
}

#[test]
fn test_visibility_survives_in_flags() {
    let mut arena = DeclArena::new();
    let hidden = FunctionBuilder::new("hidden", Ty::named("Unit"))
        .visibility(Visibility::Private)
        .bind(&mut arena, None);

    let synthetic = SyntheticPropertyMap::default();
    let ctx = SerializerContext::new(&arena, &synthetic);
    let unit = serialize_unit(&ctx, "vis", &[hidden], &OrdinaryExtension).unwrap();

    let word = unit.functions[0].flags;
    assert_eq!(flags::visibility_of(word), 3);
}

#[test]
fn test_json_dump_is_available() {
    let mut arena = DeclArena::new();
    let mut map = SyntheticPropertyMap::default();
    let color = lowered_color_module(&mut arena, &mut map);

    let ctx = SerializerContext::new(&arena, &map);
    let unit = serialize_unit(&ctx, "colors", &[color], &OrdinaryExtension).unwrap();

    let dump = serde_json::to_string_pretty(&unit).unwrap();
    assert!(dump.contains("\"classes\""));
    assert!(dump.contains("\"strings\""));
}
