//! The serde-facing walker.
//!
//! - **`filterable`**: the `Filterable` trait and its std impls
//! - **`walker`**: the per-container `StructWalker` driven by derived code

mod filterable;
mod walker;

pub use filterable::{Filterable, Filtered, Plain};
pub use walker::{begin_struct, begin_struct_variant, StructSink, StructWalker, VariantSink};
