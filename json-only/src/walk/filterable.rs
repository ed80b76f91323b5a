//! Types that can be walked by a filtering pass.
//!
//! - [`Filterable`]: how a value serializes under a pass, and where a rule
//!   staged "on this value" actually lands
//! - [`Filtered`]: a value paired with its pass, usable as `serde::Serialize`
//! - [`Plain`]: opt-out wrapper that serializes through `serde::Serialize`
//!
//! ## Where staged rules land
//!
//! | Value | Staged on |
//! |-------|-----------|
//! | derived struct / enum | the value itself |
//! | `Vec`, slices, arrays, `VecDeque`, sets | each element |
//! | `HashMap`, `BTreeMap` | each value (keys are never filtered) |
//! | `Option`, `Box`, `Rc`, `Arc`, `&T`, derived newtypes | the inner value |
//! | leaves (numbers, strings, `Plain`, `serde_json::Value`) | nowhere |
//!
//! Clearing follows the same dispatch, so a rule staged through a sequence is
//! cleared element by element once the sequence has been written.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::BuildHasher,
    marker::PhantomData,
    rc::Rc,
    sync::Arc,
};

use serde::{Serialize, Serializer};

use crate::{
    allow_list::FieldAllowList,
    filter::{FilterPass, InstanceRuleTable},
};

// =============================================================================
// Filterable
// =============================================================================

/// A value the filtering walker knows how to serialize.
///
/// Derive it with `#[derive(JsonOnly)]`. Hand-written impls are needed only for
/// custom containers; leaf types can be wrapped in [`Plain`] instead.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be walked by the json_only filter",
    label = "this type does not implement `Filterable`",
    note = "use `#[derive(JsonOnly)]` on the type definition",
    note = "or mark the field `#[json_only(plain)]` to serialize it through `serde::Serialize`"
)]
pub trait Filterable {
    /// Serializes `self`, consulting `pass` for every field of every container.
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer;

    /// Stages `rule` wherever a field holding this value should apply it.
    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        rules.stage(self, rule);
    }

    /// Undoes [`Filterable::stage_rule`].
    fn clear_rule(&self, rules: &InstanceRuleTable) {
        rules.clear(self);
    }
}

// =============================================================================
// Filtered / Plain
// =============================================================================

/// A [`Filterable`] value bound to a pass.
///
/// This is what gets handed to serde: its `Serialize` impl calls back into
/// [`Filterable::serialize_filtered`].
pub struct Filtered<'v, 'f, T: ?Sized> {
    value: &'v T,
    pass: &'v FilterPass<'f>,
}

impl<'v, 'f, T: ?Sized> Filtered<'v, 'f, T> {
    pub fn new(value: &'v T, pass: &'v FilterPass<'f>) -> Self {
        Self { value, pass }
    }

    pub fn value(&self) -> &'v T {
        self.value
    }
}

impl<T> Serialize for Filtered<'_, '_, T>
where
    T: Filterable + ?Sized,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize_filtered(self.pass, serializer)
    }
}

/// Serializes the wrapped value through plain `serde::Serialize`.
///
/// The field itself is still subject to its container's decision, but nothing
/// below it is filtered and rules staged on it are dropped.
#[derive(Debug)]
pub struct Plain<'v, T: ?Sized>(pub &'v T);

impl<T: ?Sized> Clone for Plain<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Plain<'_, T> {}

impl<T> Filterable for Plain<'_, T>
where
    T: Serialize + ?Sized,
{
    fn serialize_filtered<S>(&self, _pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }

    fn stage_rule(&self, _rules: &InstanceRuleTable, _rule: &FieldAllowList) {}

    fn clear_rule(&self, _rules: &InstanceRuleTable) {}
}

// =============================================================================
// Leaves
// =============================================================================

macro_rules! impl_filterable_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Filterable for $ty {
                fn serialize_filtered<S>(
                    &self,
                    _pass: &FilterPass<'_>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    Serialize::serialize(self, serializer)
                }

                fn stage_rule(&self, _rules: &InstanceRuleTable, _rule: &FieldAllowList) {}

                fn clear_rule(&self, _rules: &InstanceRuleTable) {}
            }
        )*
    };
}

impl_filterable_leaf!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    (),
    str,
    String,
    Cow<'_, str>,
    serde_json::Value,
);

impl<T: ?Sized> Filterable for PhantomData<T> {
    fn serialize_filtered<S>(&self, _pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_unit_struct("PhantomData")
    }

    fn stage_rule(&self, _rules: &InstanceRuleTable, _rule: &FieldAllowList) {}

    fn clear_rule(&self, _rules: &InstanceRuleTable) {}
}

// =============================================================================
// Transparent wrappers
// =============================================================================

impl<T> Filterable for Option<T>
where
    T: Filterable,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Some(value) => serializer.serialize_some(&pass.filtered(value)),
            None => serializer.serialize_none(),
        }
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        if let Some(value) = self {
            value.stage_rule(rules, rule);
        }
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        if let Some(value) = self {
            value.clear_rule(rules);
        }
    }
}

macro_rules! impl_filterable_deref {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T> Filterable for $ptr<T>
            where
                T: Filterable + ?Sized,
            {
                fn serialize_filtered<S>(
                    &self,
                    pass: &FilterPass<'_>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    (**self).serialize_filtered(pass, serializer)
                }

                fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
                    (**self).stage_rule(rules, rule);
                }

                fn clear_rule(&self, rules: &InstanceRuleTable) {
                    (**self).clear_rule(rules);
                }
            }
        )*
    };
}

impl_filterable_deref!(Box, Rc, Arc);

impl<T> Filterable for &T
where
    T: Filterable + ?Sized,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (**self).serialize_filtered(pass, serializer)
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        (**self).stage_rule(rules, rule);
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        (**self).clear_rule(rules);
    }
}

// =============================================================================
// Sequences and maps
// =============================================================================

impl<T> Filterable for [T]
where
    T: Filterable,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|value| pass.filtered(value)))
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        for value in self {
            value.stage_rule(rules, rule);
        }
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        for value in self {
            value.clear_rule(rules);
        }
    }
}

impl<T, const N: usize> Filterable for [T; N]
where
    T: Filterable,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_slice().serialize_filtered(pass, serializer)
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        self.as_slice().stage_rule(rules, rule);
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        self.as_slice().clear_rule(rules);
    }
}

impl<T> Filterable for Vec<T>
where
    T: Filterable,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_slice().serialize_filtered(pass, serializer)
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        self.as_slice().stage_rule(rules, rule);
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        self.as_slice().clear_rule(rules);
    }
}

macro_rules! impl_filterable_iterable {
    ($(impl<$($param:ident $(: $bound:path)?),*> for $ty:ty;)*) => {
        $(
            impl<T, $($param $(: $bound)?),*> Filterable for $ty
            where
                T: Filterable,
            {
                fn serialize_filtered<S>(
                    &self,
                    pass: &FilterPass<'_>,
                    serializer: S,
                ) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.collect_seq(self.iter().map(|value| pass.filtered(value)))
                }

                fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
                    for value in self {
                        value.stage_rule(rules, rule);
                    }
                }

                fn clear_rule(&self, rules: &InstanceRuleTable) {
                    for value in self {
                        value.clear_rule(rules);
                    }
                }
            }
        )*
    };
}

impl_filterable_iterable! {
    impl<> for VecDeque<T>;
    impl<> for BTreeSet<T>;
    impl<H: BuildHasher> for HashSet<T, H>;
}

impl<K, V, H> Filterable for HashMap<K, V, H>
where
    K: Serialize,
    V: Filterable,
    H: BuildHasher,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter().map(|(key, value)| (key, pass.filtered(value))))
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        for value in self.values() {
            value.stage_rule(rules, rule);
        }
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        for value in self.values() {
            value.clear_rule(rules);
        }
    }
}

impl<K, V> Filterable for BTreeMap<K, V>
where
    K: Serialize,
    V: Filterable,
{
    fn serialize_filtered<S>(&self, pass: &FilterPass<'_>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter().map(|(key, value)| (key, pass.filtered(value))))
    }

    fn stage_rule(&self, rules: &InstanceRuleTable, rule: &FieldAllowList) {
        for value in self.values() {
            value.stage_rule(rules, rule);
        }
    }

    fn clear_rule(&self, rules: &InstanceRuleTable) {
        for value in self.values() {
            value.clear_rule(rules);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, HashMap},
        rc::Rc,
        sync::Arc,
    };

    use serde_json::json;

    use super::{Filterable, Plain};
    use crate::{FieldAllowList, FieldFilter, FieldSet, InstanceRuleTable, JsonOnly};

    #[derive(JsonOnly)]
    struct Item {
        id: u32,
        label: String,
    }

    fn item(id: u32) -> Item {
        Item {
            id,
            label: format!("item-{id}"),
        }
    }

    fn rule(fields: &[&str]) -> FieldAllowList {
        FieldAllowList::new(fields.iter().copied()).unwrap()
    }

    fn set(fields: &[&str]) -> FieldSet {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn sequence_stages_each_element_not_itself() {
        let items = vec![item(1), item(2), item(3)];
        let table = InstanceRuleTable::new();
        items.stage_rule(&table, &rule(&["id"]));

        assert_eq!(table.len(), 3);
        assert_eq!(table.peek(&items), None);
        for each in &items {
            assert_eq!(table.peek(each), Some(set(&["id"])));
        }

        items.clear_rule(&table);
        assert!(table.is_empty());
    }

    #[test]
    fn map_stages_values_only() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), item(1));
        let table = InstanceRuleTable::new();
        map.stage_rule(&table, &rule(&["label"]));
        assert_eq!(table.peek(&map["a"]), Some(set(&["label"])));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn wrappers_stage_through_to_the_inner_value() {
        let boxed = Box::new(item(1));
        let shared = Rc::new(item(2));
        let atomic = Arc::new(item(3));
        let maybe = Some(item(4));
        let table = InstanceRuleTable::new();

        boxed.stage_rule(&table, &rule(&["id"]));
        shared.stage_rule(&table, &rule(&["id"]));
        atomic.stage_rule(&table, &rule(&["id"]));
        maybe.stage_rule(&table, &rule(&["id"]));

        assert!(table.peek(&*boxed).is_some());
        assert!(table.peek(&*shared).is_some());
        assert!(table.peek(&*atomic).is_some());
        assert!(table.peek(maybe.as_ref().unwrap()).is_some());
    }

    #[test]
    fn leaves_ignore_staging() {
        let table = InstanceRuleTable::new();
        "text".to_string().stage_rule(&table, &rule(&["x"]));
        42_u64.stage_rule(&table, &rule(&["x"]));
        Plain(&vec![1, 2]).stage_rule(&table, &rule(&["x"]));
        assert!(table.is_empty());
    }

    #[test]
    fn containers_serialize_their_elements_through_the_pass() {
        let filter = FieldFilter::new();
        filter.register_rule::<Item, _, _>(["id"]);

        let mut map: HashMap<String, Item> = HashMap::new();
        map.insert("first".to_string(), item(1));

        assert_eq!(
            filter.to_value(&vec![Some(item(1)), None]).unwrap(),
            json!([{ "id": 1 }, null])
        );
        assert_eq!(filter.to_value(&map).unwrap(), json!({ "first": { "id": 1 } }));
        assert_eq!(filter.to_value(&[item(2)]).unwrap(), json!([{ "id": 2 }]));
    }

    #[test]
    fn plain_serializes_without_filtering() {
        let filter = FieldFilter::new();
        let raw = json!({ "nested": { "keep": true } });
        assert_eq!(filter.to_value(&Plain(&raw)).unwrap(), raw);
    }
}
