//! Interning tables
//!
//! Each table deduplicates canonical values behind stable, monotonically
//! increasing ids: the first occurrence of a value wins its id, and no id
//! is ever reused, removed, or renumbered within a serialization session.

use crate::records::VersionRequirement;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use vela_ir::{DeclId, Ty};

/// Generic append-only deduplicating table
#[derive(Debug, Clone)]
pub struct InternTable<T> {
    map: FxHashMap<T, u32>,
    values: Vec<T>,
}

impl<T: Eq + Hash + Clone> InternTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            values: Vec::new(),
        }
    }

    /// Return the id of `value`, assigning the next unused id on first sight
    pub fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }
        let id = self.values.len() as u32;
        self.map.insert(value.clone(), id);
        self.values.push(value);
        id
    }

    /// Id of `value` if it has been interned
    pub fn id_of(&self, value: &T) -> Option<u32> {
        self.map.get(value).copied()
    }

    /// Value behind `id`
    pub fn get(&self, id: u32) -> Option<&T> {
        self.values.get(id as usize)
    }

    /// Number of interned values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing has been interned
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate values in id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Snapshot the values in id order
    pub fn to_vec(&self) -> Vec<T> {
        self.values.clone()
    }
}

impl<T: Eq + Hash + Clone> Default for InternTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Name index table, shared across an entire serialization session
pub type StringTable = InternTable<String>;

/// Type-parameter id table, shared across a nested serializer chain
pub type TypeParameterTable = InternTable<DeclId>;

/// Type table, scoped to the declaration subtree that embeds it
pub type TypeTable = InternTable<Ty>;

/// Version-requirement table, scoped like the type table
pub type VersionRequirementTable = InternTable<VersionRequirement>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_dedup() {
        let mut table: TypeTable = InternTable::new();
        let first = table.intern(Ty::array(Ty::named("Color")));
        let second = table.intern(Ty::array(Ty::named("Color")));
        let third = table.intern(Ty::named("Color"));

        assert_eq!(first, second);
        assert_ne!(first, third);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_seen_wins_and_ids_are_dense() {
        let mut table: StringTable = InternTable::new();
        for (expected, name) in ["values", "get", "values", "ordinal"].iter().enumerate() {
            let id = table.intern((*name).to_string());
            // "values" re-interns to 0; fresh names take the next slot
            if *name == "values" {
                assert_eq!(id, 0);
            } else {
                assert!(id as usize <= expected);
            }
        }
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2).map(String::as_str), Some("ordinal"));
        assert_eq!(table.id_of(&"get".to_string()), Some(1));
    }
}
