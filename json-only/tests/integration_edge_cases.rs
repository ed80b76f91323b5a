//! Edge-case coverage for rule interaction within and across passes.
//!
//! These tests focus on shared instances, rules staged on fields that are
//! never written, conflicting registrations, and failure propagation from the
//! underlying serializer.

use std::{convert::Infallible, io, rc::Rc, thread};

use json_only::{filter::FieldSink, Decision, FieldFilter, FieldSet, FieldVisit, JsonOnly};
use serde::Serialize;
use serde_json::json;

#[derive(JsonOnly)]
struct Member {
    name: String,
    email: String,
}

fn member(name: &str) -> Member {
    Member {
        name: name.into(),
        email: format!("{name}@example.com"),
    }
}

#[test]
fn test_shared_instance_is_cleared_between_fields() {
    #[derive(JsonOnly)]
    struct Pair {
        #[json_only("name")]
        left: Rc<Member>,
        right: Rc<Member>,
    }

    let filter = FieldFilter::new();
    let shared = Rc::new(member("a"));
    let pair = Pair {
        left: Rc::clone(&shared),
        right: shared,
    };

    assert_eq!(
        filter.to_value(&pair).unwrap(),
        json!({
            "left": { "name": "a" },
            "right": { "name": "a", "email": "a@example.com" },
        })
    );
}

#[test]
fn test_omitted_field_rule_lingers_for_the_rest_of_the_pass() {
    #[derive(JsonOnly)]
    #[json_only("right")]
    struct Pair {
        #[json_only("name")]
        left: Rc<Member>,
        #[json_only("name", "email")]
        right: Rc<Member>,
    }

    let filter = FieldFilter::new();
    let shared = Rc::new(member("a"));
    let pair = Pair {
        left: Rc::clone(&shared),
        right: shared,
    };

    // `left` is omitted, so its rule stays staged and narrows `right`.
    assert_eq!(filter.to_value(&pair).unwrap(), json!({ "right": { "name": "a" } }));

    // A fresh pass starts clean.
    let pass = filter.pass();
    assert!(pass.staged_rule(&*pair.left).is_none());
}

#[test]
fn test_conflicting_registrations_omit_every_field() {
    let filter = FieldFilter::new();
    filter
        .register_rule::<Member, _, _>(["name"])
        .register_rule::<Member, _, _>(["email"]);

    assert_eq!(filter.type_rule::<Member>(), Some(FieldSet::new()));
    assert!(filter.participates_in_filtering::<Member>());
    assert_eq!(filter.to_value(&member("a")).unwrap(), json!({}));
}

#[test]
fn test_type_rule_and_field_rule_intersect() {
    #[derive(JsonOnly)]
    struct Holder {
        #[json_only("email", "phone")]
        member: Member,
    }

    let filter = FieldFilter::new();
    filter.register_rule::<Member, _, _>(["name", "email"]);
    let holder = Holder {
        member: member("a"),
    };
    assert_eq!(
        filter.to_value(&holder).unwrap(),
        json!({ "member": { "email": "a@example.com" } })
    );
}

#[test]
fn test_dotted_entry_without_child_is_ignored() {
    #[derive(JsonOnly)]
    struct Holder {
        member: Member,
        n: u8,
    }

    let filter = FieldFilter::new();
    filter.register_rule::<Holder, _, _>(["member.", "n"]);
    let holder = Holder {
        member: member("a"),
        n: 1,
    };
    assert_eq!(filter.to_value(&holder).unwrap(), json!({ "n": 1 }));
}

#[test]
fn test_empty_one_off_rule_leaves_value_unfiltered() {
    let filter = FieldFilter::new();
    let m = member("a");
    let pass = filter.pass();
    pass.stage(&m, Vec::<String>::new());
    assert_eq!(
        pass.to_value(&m).unwrap(),
        json!({ "name": "a", "email": "a@example.com" })
    );
}

#[derive(Default)]
struct Recorder {
    written: Vec<&'static str>,
    skipped: Vec<&'static str>,
}

impl FieldSink for Recorder {
    type Ok = ();
    type Error = Infallible;

    fn write<T>(&mut self, name: &'static str, _value: &T) -> Result<(), Infallible>
    where
        T: Serialize + ?Sized,
    {
        self.written.push(name);
        Ok(())
    }

    fn skip(&mut self, name: &'static str) -> Result<(), Infallible> {
        self.skipped.push(name);
        Ok(())
    }

    fn end(self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[test]
fn test_omitted_fields_reach_the_skip_hook() {
    let filter = FieldFilter::new();
    filter.register_rule::<Member, _, _>(["name"]);
    let pass = filter.pass();
    let m = member("a");
    let mut sink = Recorder::default();

    let name = pass
        .write_field(&mut sink, &FieldVisit::new(&m, "name", &m.name))
        .unwrap();
    let email = pass
        .write_field(&mut sink, &FieldVisit::new(&m, "email", &m.email))
        .unwrap();

    assert_eq!(name, Decision::Emit);
    assert_eq!(email, Decision::Omit);
    assert_eq!(sink.written, ["name"]);
    assert_eq!(sink.skipped, ["email"]);
}

struct FailingWriter;

impl io::Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_writer_errors_propagate_unchanged() {
    let filter = FieldFilter::new();
    let err = filter.to_writer(FailingWriter, &member("a")).unwrap_err();
    assert!(err.is_io());
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_filter_is_shared_across_threads() {
    #[derive(JsonOnly)]
    #[json_only("name")]
    struct Badge {
        name: String,
        secret: String,
    }

    let filter = FieldFilter::new();
    thread::scope(|scope| {
        for worker in 0..8 {
            let filter = &filter;
            scope.spawn(move || {
                for _ in 0..50 {
                    let badge = Badge {
                        name: format!("w{worker}"),
                        secret: "s".into(),
                    };
                    assert_eq!(
                        filter.to_value(&badge).unwrap(),
                        json!({ "name": format!("w{worker}") })
                    );
                }
            });
        }
    });
    assert_eq!(filter.type_rule::<Badge>().map(|r| r.len()), Some(1));
}

#[test]
fn test_global_filter_keeps_rules() {
    struct OnlyGlobal;

    FieldFilter::global().register_rule::<OnlyGlobal, _, _>(["a", "b"]);
    FieldFilter::global().register_rule::<OnlyGlobal, _, _>(["b"]);
    let expected: FieldSet = std::iter::once("b".to_string()).collect();
    assert_eq!(FieldFilter::global().type_rule::<OnlyGlobal>(), Some(expected));
}
