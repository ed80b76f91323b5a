//! Process-lifetime rules keyed by declared type.

use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
    sync::{PoisonError, RwLock},
};

use super::algebra::intersect;
use crate::allow_list::{FieldAllowList, FieldSet};

/// Identifies a declared type.
///
/// Built from [`std::any::type_name`], so borrowing (non-`'static`) types can
/// carry rules too. Each monomorphization of a generic type is its own key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Map from declared type to its accumulated allow-list.
///
/// Append-only. A second registration for the same type is intersected with
/// the stored rule, so a type's rule only ever shrinks. A rule that shrinks to
/// nothing stays registered as an empty set and excludes every field.
#[derive(Debug, Default)]
pub struct TypeRuleRegistry {
    rules: RwLock<HashMap<TypeKey, FieldSet>>,
}

impl TypeRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `rule` into the rule stored for `key` and returns the result.
    pub fn register(&self, key: TypeKey, rule: &FieldAllowList) -> FieldSet {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        match rules.entry(key) {
            Entry::Occupied(mut entry) => {
                let merged = intersect([Some(entry.get()), Some(rule.as_set())]);
                entry.insert(merged.clone());
                merged
            }
            Entry::Vacant(entry) => entry.insert(rule.as_set().clone()).clone(),
        }
    }

    /// Returns the stored rule, or `None` if `key` was never registered.
    pub fn lookup(&self, key: TypeKey) -> Option<FieldSet> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Whether `key` participates in filtering at all.
    pub fn contains(&self, key: TypeKey) -> bool {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
