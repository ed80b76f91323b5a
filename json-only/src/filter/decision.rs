//! The per-field decision: "should this field be written now?"
//!
//! The walker calls [`FilterPass::decide_field`] once for every field of every
//! container it routes through filtering, in visiting order. A decision:
//!
//! 1. registers the declaring type's own allow-list (idempotent),
//! 2. stages the field's allow-list on the field value,
//! 3. computes the effective set: type rule ∩ rule staged on the container,
//! 4. propagates dotted entries below this field onto the field value, adding
//!    the field itself to the effective set when its children are named,
//! 5. emits the field if the effective set names it, omits it otherwise.
//!
//! [`FilterPass::write_field`] wraps the decision with the actual write and
//! clears the value's staged rule once its serialization has returned.
//! Omitted values keep whatever was staged on them until the pass is dropped.

use serde::Serialize;
use slog::{debug, trace};

use super::{
    algebra::{intersect, split_by_prefix},
    engine::FilterPass,
    instance::Identity,
    registry::TypeKey,
};
use crate::{allow_list::FieldAllowList, walk::Filterable};

/// Outcome of a field decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Write the field normally.
    Emit,
    /// Write nothing, or the format's omitted-field marker.
    Omit,
}

/// Everything the decision needs to know about one field of one container.
#[derive(Debug)]
pub struct FieldVisit<'v, V: ?Sized> {
    container: Identity,
    declaring_type: TypeKey,
    name: &'static str,
    value: &'v V,
    type_rule: Option<&'v [&'v str]>,
    field_rule: Option<&'v [&'v str]>,
}

impl<'v, V: ?Sized> FieldVisit<'v, V> {
    /// A visit of field `name` holding `value` inside `container`, declared by
    /// the container's own type.
    pub fn new<C: ?Sized>(container: &C, name: &'static str, value: &'v V) -> Self {
        Self {
            container: Identity::of(container),
            declaring_type: TypeKey::of::<C>(),
            name,
            value,
            type_rule: None,
            field_rule: None,
        }
    }

    pub(crate) fn from_parts(
        container: Identity,
        declaring_type: TypeKey,
        name: &'static str,
        value: &'v V,
    ) -> Self {
        Self {
            container,
            declaring_type,
            name,
            value,
            type_rule: None,
            field_rule: None,
        }
    }

    /// Overrides the declaring type, e.g. the enum owning a struct variant.
    #[must_use]
    pub fn declared_by(mut self, declaring_type: TypeKey) -> Self {
        self.declaring_type = declaring_type;
        self
    }

    /// Attaches the allow-list declared on the declaring type.
    #[must_use]
    pub fn with_type_rule(mut self, fields: Option<&'v [&'v str]>) -> Self {
        self.type_rule = fields;
        self
    }

    /// Attaches the allow-list declared on this field.
    #[must_use]
    pub fn with_field_rule(mut self, fields: Option<&'v [&'v str]>) -> Self {
        self.field_rule = fields;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> &'v V {
        self.value
    }
}

impl FilterPass<'_> {
    /// Decides whether the visited field is written.
    pub fn decide_field<V>(&self, visit: &FieldVisit<'_, V>) -> Decision
    where
        V: Filterable + ?Sized,
    {
        let filter = self.filter();
        let instances = self.instances();

        if let Some(fields) = visit.type_rule {
            filter.register(visit.declaring_type, fields.iter().copied());
        }

        if let Some(rule) = visit.field_rule.and_then(|f| FieldAllowList::new(f.iter().copied())) {
            trace!(filter.logger(), "staging field rule";
                "field" => visit.name, "rule" => ?rule.as_set());
            visit.value.stage_rule(instances, &rule);
        }

        let type_rule = filter.types().lookup(visit.declaring_type);
        let instance_rule = instances.peek_identity(visit.container);
        let mut effective = intersect([type_rule.as_ref(), instance_rule.as_ref()]);

        let split = split_by_prefix(&effective, visit.name);
        if let Some(propagated) = &split.propagated {
            trace!(filter.logger(), "propagating nested rule";
                "field" => visit.name, "rule" => ?propagated.as_set());
            visit.value.stage_rule(instances, propagated);
            if split.include_prefix {
                effective.insert(visit.name.to_string());
            }
        }

        let decision = if effective.contains(visit.name) {
            Decision::Emit
        } else {
            Decision::Omit
        };
        debug!(filter.logger(), "field decision";
            "type" => visit.declaring_type.name(),
            "field" => visit.name,
            "effective" => ?effective,
            "decision" => ?decision);
        decision
    }

    /// Decides the visited field and performs the write on `sink`.
    ///
    /// On [`Decision::Emit`] the value is serialized and its staged rule is
    /// cleared once that returns. On [`Decision::Omit`] the sink's skip hook is
    /// called and staged rules are left in place. Serializer errors propagate
    /// unchanged.
    pub fn write_field<V, W>(
        &self,
        sink: &mut W,
        visit: &FieldVisit<'_, V>,
    ) -> Result<Decision, W::Error>
    where
        V: Filterable + ?Sized,
        W: FieldSink,
    {
        let decision = self.decide_field(visit);
        match decision {
            Decision::Emit => {
                sink.write(visit.name, &self.filtered(visit.value))?;
                visit.value.clear_rule(self.instances());
            }
            Decision::Omit => sink.skip(visit.name)?,
        }
        Ok(decision)
    }
}

/// The part of a serde compound serializer a field write needs.
///
/// Implemented by the walker's adapters over `SerializeStruct` and
/// `SerializeStructVariant`.
pub trait FieldSink {
    type Ok;
    type Error;

    fn write<T>(&mut self, name: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized;

    fn skip(&mut self, name: &'static str) -> Result<(), Self::Error>;

    fn end(self) -> Result<Self::Ok, Self::Error>;
}
