use std::collections::{BTreeMap, HashMap};

use json_only::{FieldFilter, JsonOnly};

#[derive(JsonOnly)]
struct Index<K, V> {
    #[json_only("id")]
    entries: BTreeMap<K, V>,
}

#[derive(JsonOnly)]
struct Lookup<K: std::hash::Hash + Eq, V> {
    by_key: HashMap<K, Vec<V>>,
    fallback: Option<V>,
}

#[derive(JsonOnly)]
struct Item {
    id: u32,
    label: String,
}

// Serializable but not walked.
#[derive(serde::Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Key(u32);

fn main() {
    let filter = FieldFilter::new();

    let mut entries = BTreeMap::new();
    entries.insert(Key(1), Item { id: 1, label: "a".into() });
    let index = Index { entries };
    assert_eq!(filter.to_string(&index).unwrap(), r#"{"entries":{"1":{"id":1}}}"#);

    let mut by_key = HashMap::new();
    by_key.insert("k", vec![2_u8]);
    let lookup = Lookup {
        by_key,
        fallback: None,
    };
    assert_eq!(
        filter.to_string(&lookup).unwrap(),
        r#"{"by_key":{"k":[2]},"fallback":null}"#
    );
}
