//! Allow-list driven field filtering for serde serialization.
//!
//! One domain type, many JSON shapes: instead of writing a view struct per
//! endpoint, attach allow-lists to types and fields and let a filtering pass
//! decide, field by field, what gets written.
//!
//! ```rust
//! use json_only::{FieldFilter, JsonOnly};
//!
//! #[derive(JsonOnly)]
//! #[json_only("name", "address.city")]
//! struct Person {
//!     name: String,
//!     age: u32,
//!     address: Address,
//! }
//!
//! #[derive(JsonOnly)]
//! struct Address {
//!     city: String,
//!     zip: String,
//! }
//!
//! let ann = Person {
//!     name: "Ann".into(),
//!     age: 30,
//!     address: Address { city: "NYC".into(), zip: "10001".into() },
//! };
//!
//! let json = FieldFilter::new().to_string(&ann).unwrap();
//! assert_eq!(json, r#"{"name":"Ann","address":{"city":"NYC"}}"#);
//! ```
//!
//! Key rules:
//! - A type-level `#[json_only(...)]` registers a type rule. Rules for the same
//!   type are intersected and only ever shrink.
//! - A field-level `#[json_only(...)]` restricts the value held by that field
//!   for one write. On a sequence it restricts every element.
//! - Dotted entries (`"address.city"`) restrict the nested value and keep the
//!   parent field itself.
//! - A container with neither a type rule nor a staged rule is written in full;
//!   once a rule applies, only named fields are written.
//!
//! What this crate does:
//! - holds the rules (`TypeRuleRegistry`, `InstanceRuleTable`) and the algebra
//!   that combines them
//! - decides each field (`FilterPass::decide_field`) and walks serde
//!   serializers accordingly
//! - provides a `slog` adapter for logging filtered values
//!
//! What it does not do:
//! - map, rename or reshape values beyond omitting fields
//! - validate rules against the fields a type actually has

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use json_only_derive::JsonOnly;

// Lets derived code name `::json_only` from inside this crate too.
#[allow(unused_extern_crates)]
extern crate self as json_only;

// Module declarations
mod allow_list;
pub mod filter;
pub mod slog;
mod walk;

// Re-exports
pub use allow_list::{FieldAllowList, FieldSet};
pub use filter::{
    Decision, FieldFilter, FieldVisit, FilterPass, Identity, InstanceRuleTable, TypeKey,
    TypeRuleRegistry,
};
pub use walk::{Filterable, Filtered, Plain};

#[doc(hidden)]
pub mod __private {
    pub use serde::{Serialize, Serializer};

    pub use crate::walk::{
        begin_struct, begin_struct_variant, StructSink, StructWalker, VariantSink,
    };
}
