//! Field-name sets: "which fields may be written?"
//!
//! Two shapes:
//!
//! - [`FieldSet`]: any set of field names, possibly empty. Effective sets,
//!   stored type rules and staged instance rules are `FieldSet`s, and an empty
//!   one excludes everything.
//! - [`FieldAllowList`]: a non-empty `FieldSet`. This is the only form in which
//!   user input (attributes, registration, one-off staging) reaches the engine.
//!
//! "No rule at all" is never an empty set. It is `None` wherever a rule is
//! optional.

use std::collections::BTreeSet;

/// An ordered set of field names. Entries may be dotted paths such as
/// `"address.city"`.
pub type FieldSet = BTreeSet<String>;

/// A non-empty set of allowed field names.
///
/// Order of construction is irrelevant and duplicates collapse. Equality is by
/// content.
///
/// ```rust
/// use json_only::FieldAllowList;
///
/// let rule = FieldAllowList::new(["name", "address.city", "name"]).unwrap();
/// assert_eq!(rule.len(), 2);
/// assert!(rule.contains("address.city"));
///
/// assert!(FieldAllowList::new(Vec::<String>::new()).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldAllowList(FieldSet);

impl FieldAllowList {
    /// Builds an allow-list from field names. Returns `None` when `fields` is empty.
    pub fn new<I, S>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_set(fields.into_iter().map(Into::into).collect())
    }

    /// Wraps an existing set. Returns `None` when `set` is empty.
    pub fn from_set(set: FieldSet) -> Option<Self> {
        if set.is_empty() {
            None
        } else {
            Some(Self(set))
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Borrows the underlying set.
    pub fn as_set(&self) -> &FieldSet {
        &self.0
    }

    pub fn into_set(self) -> FieldSet {
        self.0
    }
}

impl AsRef<FieldSet> for FieldAllowList {
    fn as_ref(&self) -> &FieldSet {
        &self.0
    }
}

impl<'a> IntoIterator for &'a FieldAllowList {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
