//! Rules staged against individual object identities.
//!
//! A table lives exactly as long as the [`FilterPass`](super::FilterPass)
//! that owns it. Keys hold no borrow of the values they describe, and dropping
//! the pass reclaims whatever was never cleared explicitly.

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Mutex, PoisonError},
};

use super::algebra::intersect;
use crate::allow_list::{FieldAllowList, FieldSet};

/// Object identity: address plus concrete type.
///
/// The type component separates a struct from its first field, which shares
/// its address. Identities are only compared, never dereferenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    addr: usize,
    type_name: &'static str,
}

impl Identity {
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self {
            addr: std::ptr::from_ref(value).cast::<()>() as usize,
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(self) -> &'static str {
        self.type_name
    }
}

/// Identity-keyed staged rules for one serialization pass.
///
/// Staging onto an identity that already has a rule intersects the two.
/// A merge can produce an empty set, which excludes every field of that
/// instance.
#[derive(Debug, Default)]
pub struct InstanceRuleTable {
    rules: Mutex<HashMap<Identity, FieldSet>>,
}

impl InstanceRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `rule` against `value`'s identity, merging with any rule
    /// already staged there.
    pub fn stage<T: ?Sized>(&self, value: &T, rule: &FieldAllowList) {
        self.stage_identity(Identity::of(value), rule);
    }

    pub(crate) fn stage_identity(&self, identity: Identity, rule: &FieldAllowList) {
        let mut rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        match rules.entry(identity) {
            Entry::Occupied(mut entry) => {
                let merged = intersect([Some(entry.get()), Some(rule.as_set())]);
                entry.insert(merged);
            }
            Entry::Vacant(entry) => {
                entry.insert(rule.as_set().clone());
            }
        }
    }

    /// Returns the rule staged for `value`, if any.
    pub fn peek<T: ?Sized>(&self, value: &T) -> Option<FieldSet> {
        self.peek_identity(Identity::of(value))
    }

    pub(crate) fn peek_identity(&self, identity: Identity) -> Option<FieldSet> {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&identity)
            .cloned()
    }

    /// Removes the rule staged for `value`. Safe when nothing is staged.
    pub fn clear<T: ?Sized>(&self, value: &T) {
        self.clear_identity(Identity::of(value));
    }

    pub(crate) fn clear_identity(&self, identity: Identity) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&identity);
    }

    pub fn len(&self) -> usize {
        self.rules.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
