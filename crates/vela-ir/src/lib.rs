//! Vela Backend IR
//!
//! This crate provides the declaration tree, structural type
//! representation, and builtin registry shared by the backend lowering and
//! metadata serialization passes.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build;
pub mod builtins;
pub mod decl;
pub mod ty;

pub use build::{
    ClassBuilder, ConstructorBuilder, EnumEntryBuilder, FieldBuilder, FunctionBuilder,
    PropertyBuilder, TypeParameterBuilder, ValueParameterBuilder,
};
pub use builtins::Builtins;
pub use decl::{
    ClassDecl, ClassKind, ConstructorDecl, Contract, ContractEffect, DeclArena, DeclId, DeclKind,
    Declaration, FieldDecl, FunctionDecl, InvocationKind, MemberKind, Modality, PropertyDecl,
    SyntheticPropertyMap, TypeParameterDecl, ValueParameterDecl, Variance, Visibility,
};
pub use ty::Ty;
