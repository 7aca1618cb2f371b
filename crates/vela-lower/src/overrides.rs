//! Override synthesis
//!
//! Computing the members a class must implicitly inherit from its
//! supertypes is a capability of the surrounding compiler, invoked
//! explicitly after supertypes are attached. It is never a side effect of
//! attachment, so the lowering code controls exactly when and in what
//! order synthesized members appear.

use rustc_hash::FxHashSet;
use vela_ir::{DeclArena, DeclId, Modality, Ty, Visibility};

/// Description of a member that must be synthesized on a class
#[derive(Debug, Clone)]
pub struct SyntheticMember {
    /// Member name
    pub name: String,
    /// Return type
    pub return_ty: Ty,
    /// Value parameters as (name, type) pairs
    pub params: Vec<(String, Ty)>,
}

/// Capability that computes required override members for a class once its
/// supertypes are attached
pub trait OverrideSynthesizer {
    /// Members `class` must synthesize to satisfy its supertype contracts,
    /// in supertype-declaration order
    fn required_overrides(&self, arena: &DeclArena, class: DeclId) -> Vec<SyntheticMember>;
}

/// Default synthesis: walk the direct supertypes and collect every open,
/// non-private member function the class does not already declare.
pub struct SupertypeOverrides;

impl OverrideSynthesizer for SupertypeOverrides {
    fn required_overrides(&self, arena: &DeclArena, class: DeclId) -> Vec<SyntheticMember> {
        let Some(decl) = arena.class(class) else {
            return Vec::new();
        };
        let own: FxHashSet<&str> = decl.members.iter().map(|&member| arena.name(member)).collect();

        let mut required = Vec::new();
        for supertype in &decl.supertypes {
            let Ty::Class { name, .. } = supertype else {
                continue;
            };
            let Some(super_id) = arena.find_top_level_class(name) else {
                continue;
            };
            let Some(super_class) = arena.class(super_id) else {
                continue;
            };
            for &member in &super_class.members {
                let Some(function) = arena.function(member) else {
                    continue;
                };
                if function.modality == Modality::Final
                    || function.visibility == Visibility::Private
                {
                    continue;
                }
                let member_name = arena.name(member);
                if own.contains(member_name)
                    || required
                        .iter()
                        .any(|existing: &SyntheticMember| existing.name == member_name)
                {
                    continue;
                }
                let params = function
                    .value_params
                    .iter()
                    .map(|&param| {
                        let ty = arena
                            .value_parameter(param)
                            .map(|decl| decl.ty.clone())
                            .unwrap_or(Ty::Error);
                        (arena.name(param).to_string(), ty)
                    })
                    .collect();
                required.push(SyntheticMember {
                    name: member_name.to_string(),
                    return_ty: function.return_ty.clone(),
                    params,
                });
            }
        }
        required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_ir::{Builtins, ClassBuilder, ClassKind, DeclArena};

    #[test]
    fn test_any_contract_members_are_required() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);

        let object = ClassBuilder::new("$Entries", ClassKind::Object).bind(&mut arena, None);
        arena.add_supertype(object, builtins.any_ty());

        let required = SupertypeOverrides.required_overrides(&arena, object);
        let names: Vec<&str> = required.iter().map(|member| member.name.as_str()).collect();
        assert_eq!(names, vec!["toString", "hashCode", "equals"]);

        // equals carries its parameter through
        let equals = &required[2];
        assert_eq!(equals.params.len(), 1);
        assert_eq!(equals.params[0].0, "other");
    }

    #[test]
    fn test_already_declared_members_are_skipped() {
        let mut arena = DeclArena::new();
        let builtins = Builtins::install(&mut arena);

        let object = ClassBuilder::new("$Entries", ClassKind::Object).bind(&mut arena, None);
        arena.add_supertype(object, builtins.any_ty());
        let own =
            vela_ir::FunctionBuilder::new("toString", Ty::named("String")).bind(&mut arena, Some(object));
        arena.add_member(object, own);

        let required = SupertypeOverrides.required_overrides(&arena, object);
        assert!(required.iter().all(|member| member.name != "toString"));
    }
}
