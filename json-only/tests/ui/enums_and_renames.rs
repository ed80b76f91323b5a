use json_only::{FieldFilter, JsonOnly};
use serde::Serialize;

#[derive(Serialize)]
struct Stamp {
    at: u64,
}

#[derive(JsonOnly)]
struct Body {
    kind: String,
    text: String,
}

#[derive(JsonOnly)]
#[json_only("id", "createdAt", "body.kind")]
enum Message {
    Empty,
    Raw(#[json_only(plain)] Stamp),
    Wrapped(Body),
    Full {
        id: u64,
        #[json_only(plain, rename = "createdAt")]
        created_at: Stamp,
        body: Body,
        hidden: bool,
    },
}

#[derive(JsonOnly)]
enum Never {}

#[derive(JsonOnly)]
struct Marker;

#[derive(JsonOnly)]
struct Envelope<'a> {
    #[json_only("text")]
    message: &'a Message,
    marker: Marker,
    r#type: &'static str,
}

fn main() {
    let filter = FieldFilter::new();
    let full = Message::Full {
        id: 1,
        created_at: Stamp { at: 5 },
        body: Body {
            kind: "k".into(),
            text: "t".into(),
        },
        hidden: true,
    };
    assert_eq!(
        filter.to_string(&full).unwrap(),
        r#"{"Full":{"id":1,"createdAt":{"at":5},"body":{"kind":"k"}}}"#
    );
    assert_eq!(filter.to_string(&Message::Empty).unwrap(), r#""Empty""#);
    assert_eq!(
        filter.to_string(&Message::Raw(Stamp { at: 2 })).unwrap(),
        r#"{"Raw":{"at":2}}"#
    );

    let wrapped = Message::Wrapped(Body {
        kind: "k".into(),
        text: "t".into(),
    });
    let envelope = Envelope {
        message: &wrapped,
        marker: Marker,
        r#type: "note",
    };
    assert_eq!(
        filter.to_string(&envelope).unwrap(),
        r#"{"message":{"Wrapped":{"text":"t"}},"marker":null,"type":"note"}"#
    );

    let _ = std::mem::size_of::<Never>();
}
