//! Rule resolution and propagation.
//!
//! This module ties the pieces together:
//!
//! - **`algebra`**: pure set operations (`intersect`, `split_by_prefix`)
//! - **`registry`**: process-lifetime rules keyed by type (`TypeRuleRegistry`)
//! - **`instance`**: per-pass rules keyed by object identity (`InstanceRuleTable`)
//! - **`decision`**: the per-field emit/omit decision (`FilterPass::decide_field`)
//! - **`engine`**: the long-lived `FieldFilter` and the per-call `FilterPass`
//!
//! Recursion is driven by the walker in `crate::walk`, never by this module.

mod algebra;
mod decision;
mod engine;
mod instance;
mod registry;

pub use algebra::{intersect, split_by_prefix, PrefixSplit};
pub use decision::{Decision, FieldSink, FieldVisit};
pub use engine::{FieldFilter, FilterPass};
pub use instance::{Identity, InstanceRuleTable};
pub use registry::{TypeKey, TypeRuleRegistry};
