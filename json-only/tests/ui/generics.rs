use std::marker::PhantomData;

use json_only::{FieldFilter, JsonOnly};

#[derive(JsonOnly)]
struct Page<T> {
    #[json_only("id")]
    items: Vec<T>,
    next: Option<Box<Page<T>>>,
}

#[derive(JsonOnly)]
struct Item {
    id: u32,
    label: String,
}

#[derive(JsonOnly)]
struct TypedId<T> {
    id: String,
    _marker: PhantomData<T>,
}

// Implements neither `Filterable` nor `Serialize`.
struct External;

#[derive(JsonOnly)]
#[json_only("name")]
struct View<'a, T> {
    name: &'a str,
    rest: &'a [T],
}

fn main() {
    let filter = FieldFilter::new();
    let page = Page {
        items: vec![Item { id: 1, label: "a".into() }],
        next: None,
    };
    assert_eq!(
        filter.to_string(&page).unwrap(),
        r#"{"items":[{"id":1}],"next":null}"#
    );

    let typed: TypedId<External> = TypedId {
        id: "x".into(),
        _marker: PhantomData,
    };
    assert_eq!(filter.to_string(&typed).unwrap(), r#"{"id":"x","_marker":null}"#);

    let rest = [1_u8, 2];
    let view = View { name: "v", rest: &rest };
    assert_eq!(filter.to_string(&view).unwrap(), r#"{"name":"v"}"#);
}
