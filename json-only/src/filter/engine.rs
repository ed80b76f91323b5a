//! Long-lived filter configuration and per-call serialization passes.

use std::{fmt, io, sync::OnceLock};

use serde::Serializer;
use serde_json::Value as JsonValue;
use slog::{debug, error, o, trace, Discard, Logger};

use super::{
    instance::InstanceRuleTable,
    registry::{TypeKey, TypeRuleRegistry},
};
use crate::{
    allow_list::{FieldAllowList, FieldSet},
    walk::{Filterable, Filtered},
};

/// Holds the type rules and the diagnostics logger.
///
/// A `FieldFilter` is cheap to share (`Send + Sync`) and is typically built once:
///
/// ```rust
/// use json_only::FieldFilter;
///
/// struct Account;
///
/// let filter = FieldFilter::new();
/// filter
///     .register_rule::<Account, _, _>(["id", "owner.name"])
///     .register_rule::<Account, _, _>(["id", "owner.name", "balance"]);
///
/// assert_eq!(filter.type_rule::<Account>().unwrap().len(), 2);
/// ```
///
/// Serialization goes through a [`FilterPass`], which carries the per-call
/// instance rules. The `to_*` helpers open a pass for you.
pub struct FieldFilter {
    types: TypeRuleRegistry,
    logger: Logger,
}

impl FieldFilter {
    /// Creates a filter that discards diagnostics.
    pub fn new() -> Self {
        Self::with_logger(Logger::root(Discard, o!()))
    }

    /// Creates a filter that reports diagnostics to `logger`.
    pub fn with_logger(logger: Logger) -> Self {
        Self {
            types: TypeRuleRegistry::new(),
            logger: logger.new(o!("component" => "json_only")),
        }
    }

    /// The process-wide filter.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<FieldFilter> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Registers a type rule for `T`, intersecting with any existing rule.
    ///
    /// An empty field list is reported through the logger and ignored.
    pub fn register_rule<T, I, S>(&self, fields: I) -> &Self
    where
        T: ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(TypeKey::of::<T>(), fields)
    }

    /// Registers a type rule under an explicit key.
    pub fn register<I, S>(&self, key: TypeKey, fields: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match FieldAllowList::new(fields) {
            Some(rule) => {
                let merged = self.types.register(key, &rule);
                trace!(self.logger, "type rule registered";
                    "type" => key.name(), "rule" => ?merged);
            }
            None => {
                error!(self.logger, "adding rule ignored";
                    "type" => key.name(), "cause" => "empty field list");
            }
        }
        self
    }

    /// The rule currently stored for `T`, or `None` if `T` was never registered.
    pub fn type_rule<T: ?Sized>(&self) -> Option<FieldSet> {
        self.types.lookup(TypeKey::of::<T>())
    }

    /// Whether `T` has a type rule.
    pub fn participates_in_filtering<T: ?Sized>(&self) -> bool {
        self.types.contains(TypeKey::of::<T>())
    }

    pub fn types(&self) -> &TypeRuleRegistry {
        &self.types
    }

    /// Opens a serialization pass.
    pub fn pass(&self) -> FilterPass<'_> {
        FilterPass::new(self)
    }

    /// Serializes `value` through a fresh pass.
    pub fn serialize<T, S>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Filterable + ?Sized,
        S: Serializer,
    {
        self.pass().serialize(value, serializer)
    }

    pub fn to_value<T>(&self, value: &T) -> serde_json::Result<JsonValue>
    where
        T: Filterable + ?Sized,
    {
        self.pass().to_value(value)
    }

    pub fn to_string<T>(&self, value: &T) -> serde_json::Result<String>
    where
        T: Filterable + ?Sized,
    {
        self.pass().to_string(value)
    }

    pub fn to_string_pretty<T>(&self, value: &T) -> serde_json::Result<String>
    where
        T: Filterable + ?Sized,
    {
        let pass = self.pass();
        serde_json::to_string_pretty(&pass.filtered(value))
    }

    pub fn to_vec<T>(&self, value: &T) -> serde_json::Result<Vec<u8>>
    where
        T: Filterable + ?Sized,
    {
        let pass = self.pass();
        serde_json::to_vec(&pass.filtered(value))
    }

    pub fn to_writer<W, T>(&self, writer: W, value: &T) -> serde_json::Result<()>
    where
        W: io::Write,
        T: Filterable + ?Sized,
    {
        let pass = self.pass();
        serde_json::to_writer(writer, &pass.filtered(value))
    }
}

impl Default for FieldFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldFilter")
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}

/// One serialization pass.
///
/// Owns the instance rules staged while walking one object graph. Rules left
/// behind by omitted fields are dropped with the pass.
#[derive(Debug)]
pub struct FilterPass<'f> {
    filter: &'f FieldFilter,
    instances: InstanceRuleTable,
}

impl<'f> FilterPass<'f> {
    pub fn new(filter: &'f FieldFilter) -> Self {
        Self {
            filter,
            instances: InstanceRuleTable::new(),
        }
    }

    pub fn filter(&self) -> &'f FieldFilter {
        self.filter
    }

    pub fn instances(&self) -> &InstanceRuleTable {
        &self.instances
    }

    /// Stages a one-off rule for `value`, to be applied when this pass walks it.
    ///
    /// Collections stage the rule on each element. An empty field list is
    /// ignored.
    pub fn stage<T, I, S>(&self, value: &T, fields: I) -> &Self
    where
        T: Filterable + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(rule) = FieldAllowList::new(fields) {
            value.stage_rule(&self.instances, &rule);
        }
        self
    }

    /// The rule staged for `value`, if any.
    pub fn staged_rule<T: ?Sized>(&self, value: &T) -> Option<FieldSet> {
        self.instances.peek(value)
    }

    /// Whether `container` should be routed through field decisions: its type
    /// has a rule, or a rule was staged for this instance.
    pub fn participates_in_filtering<T: ?Sized>(&self, container: &T) -> bool {
        let participates = self.filter.participates_in_filtering::<T>()
            || self.instances.peek(container).is_some();
        debug!(self.filter.logger, "routing container";
            "type" => std::any::type_name::<T>(), "filtered" => participates);
        participates
    }

    /// Pairs `value` with this pass so it can be handed to any serde serializer.
    pub fn filtered<'v, T: ?Sized>(&'v self, value: &'v T) -> Filtered<'v, 'f, T> {
        Filtered::new(value, self)
    }

    pub fn serialize<T, S>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Filterable + ?Sized,
        S: Serializer,
    {
        value.serialize_filtered(self, serializer)
    }

    pub fn to_value<T>(&self, value: &T) -> serde_json::Result<JsonValue>
    where
        T: Filterable + ?Sized,
    {
        serde_json::to_value(self.filtered(value))
    }

    pub fn to_string<T>(&self, value: &T) -> serde_json::Result<String>
    where
        T: Filterable + ?Sized,
    {
        serde_json::to_string(&self.filtered(value))
    }
}
