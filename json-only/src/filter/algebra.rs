//! Pure set operations over allow-lists.
//!
//! Nothing here touches shared state. The registry, the instance table and the
//! field decision all combine rules through these two functions.

use crate::allow_list::{FieldAllowList, FieldSet};

/// Intersects every present rule.
///
/// `None` entries contribute no constraint and are skipped. With zero present
/// entries the result is the empty set, which downstream means "nothing from
/// this source is allowed", not "unrestricted".
///
/// ```rust
/// use json_only::{filter::intersect, FieldSet};
///
/// let ab: FieldSet = ["a", "b"].into_iter().map(String::from).collect();
/// assert_eq!(intersect([None, Some(&ab)]), ab);
/// assert!(intersect([None, None]).is_empty());
/// ```
pub fn intersect<'r, I>(rules: I) -> FieldSet
where
    I: IntoIterator<Item = Option<&'r FieldSet>>,
{
    let mut present = rules.into_iter().flatten();
    let Some(first) = present.next() else {
        return FieldSet::new();
    };

    let mut result = first.clone();
    for rule in present {
        result.retain(|field| rule.contains(field));
        if result.is_empty() {
            break;
        }
    }
    result
}

/// Result of splitting a rule on one field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixSplit {
    /// Entries `"prefix.rest"` with the prefix stripped. `None` when no entry
    /// names a child of the prefix.
    pub propagated: Option<FieldAllowList>,
    /// The prefix itself must be added to the caller's effective set, because
    /// its children are only reachable through it.
    pub include_prefix: bool,
}

/// Collects the dotted entries below `prefix` for propagation to the value of
/// that field.
///
/// `"address.city"` split on `"address"` yields `{"city"}` and asks the caller
/// to include `address`. Only the first segment is stripped, so
/// `"a.b.c"` split on `"a"` yields `{"b.c"}` for the next level to split again.
/// An entry ending at the separator (`"address."`) names no child and is
/// ignored.
pub fn split_by_prefix(fields: &FieldSet, prefix: &str) -> PrefixSplit {
    let children: FieldSet = fields
        .iter()
        .filter_map(|entry| {
            entry
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
        .collect();

    let propagated = FieldAllowList::from_set(children);
    PrefixSplit {
        include_prefix: propagated.is_some(),
        propagated,
    }
}

#[cfg(test)]
mod tests {
    use super::{intersect, split_by_prefix, FieldSet};

    fn set(fields: &[&str]) -> FieldSet {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn intersect_skips_absent_rules() {
        let ab = set(&["a", "b"]);
        assert_eq!(intersect([None, Some(&ab)]), ab);
        assert_eq!(intersect([Some(&ab), None]), ab);
    }

    #[test]
    fn intersect_without_present_rules_is_empty() {
        assert!(intersect(std::iter::empty()).is_empty());
        assert!(intersect([None, None, None]).is_empty());
    }

    #[test]
    fn intersect_is_commutative() {
        let ab = set(&["a", "b"]);
        let bc = set(&["b", "c"]);
        assert_eq!(intersect([Some(&ab), Some(&bc)]), set(&["b"]));
        assert_eq!(intersect([Some(&bc), Some(&ab)]), set(&["b"]));
    }

    #[test]
    fn intersect_is_associative() {
        let abc = set(&["a", "b", "c"]);
        let bcd = set(&["b", "c", "d"]);
        let cde = set(&["c", "d", "e"]);

        let left = intersect([Some(&abc), Some(&bcd)]);
        let left = intersect([Some(&left), Some(&cde)]);
        let right = intersect([Some(&bcd), Some(&cde)]);
        let right = intersect([Some(&abc), Some(&right)]);

        assert_eq!(left, right);
        assert_eq!(left, set(&["c"]));
        assert_eq!(intersect([Some(&abc), Some(&bcd), Some(&cde)]), left);
    }

    #[test]
    fn present_empty_rule_excludes_everything() {
        let ab = set(&["a", "b"]);
        let empty = FieldSet::new();
        assert!(intersect([Some(&ab), Some(&empty)]).is_empty());
    }

    #[test]
    fn split_strips_prefix_and_requests_inclusion() {
        let split = split_by_prefix(&set(&["x.y"]), "x");
        assert!(split.include_prefix);
        assert_eq!(split.propagated.unwrap().into_set(), set(&["y"]));
    }

    #[test]
    fn split_keeps_deeper_paths_for_the_next_level() {
        let split = split_by_prefix(&set(&["a.b.c", "a.d", "e"]), "a");
        assert_eq!(split.propagated.unwrap().into_set(), set(&["b.c", "d"]));
    }

    #[test]
    fn split_without_children_leaves_parent_alone() {
        let split = split_by_prefix(&set(&["address", "name"]), "address");
        assert!(split.propagated.is_none());
        assert!(!split.include_prefix);
    }

    #[test]
    fn split_requires_a_full_segment_match() {
        let split = split_by_prefix(&set(&["addresses.city", "address."]), "address");
        assert!(split.propagated.is_none());
        assert!(!split.include_prefix);
    }
}
