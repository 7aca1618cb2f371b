//! Structural type representation for backend declarations

use crate::decl::DeclId;
use std::fmt;

/// A type as seen by the backend: structurally comparable and hashable so
/// that type tables can deduplicate by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// Reference to a named class with type arguments
    Class {
        /// Name of the referenced class
        name: String,
        /// Type arguments for generic classes
        args: Vec<Ty>,
    },
    /// The generic array type: Array<T>
    Array(Box<Ty>),
    /// Reference to a type-parameter declaration
    Param(DeclId),
    /// Function type: (T1, ..., Tn) -> R
    Function {
        /// Parameter types
        params: Vec<Ty>,
        /// Return type
        ret: Box<Ty>,
        /// Whether this is a suspend function type
        is_suspend: bool,
    },
    /// Placeholder produced by upstream error recovery
    Error,
}

impl Ty {
    /// Reference to a named class with no type arguments
    pub fn named(name: impl Into<String>) -> Self {
        Ty::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Array of the given element type
    pub fn array(element: Ty) -> Self {
        Ty::Array(Box::new(element))
    }

    /// Function type
    pub fn function(params: Vec<Ty>, ret: Ty, is_suspend: bool) -> Self {
        Ty::Function {
            params,
            ret: Box::new(ret),
            is_suspend,
        }
    }

    /// True if a suspend-marked function type occurs anywhere in this type
    pub fn contains_suspend(&self) -> bool {
        match self {
            Ty::Class { args, .. } => args.iter().any(Ty::contains_suspend),
            Ty::Array(element) => element.contains_suspend(),
            Ty::Param(_) | Ty::Error => false,
            Ty::Function {
                params,
                ret,
                is_suspend,
            } => {
                *is_suspend
                    || params.iter().any(Ty::contains_suspend)
                    || ret.contains_suspend()
            }
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Class { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Array(element) => write!(f, "Array<{}>", element),
            Ty::Param(id) => write!(f, "{}", id),
            Ty::Function {
                params,
                ret,
                is_suspend,
            } => {
                if *is_suspend {
                    write!(f, "suspend ")?;
                }
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") -> {}", ret)
            }
            Ty::Error => write!(f, "<error>"),
        }
    }
}
