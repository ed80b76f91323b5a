//! Struct-level walking used by `#[derive(JsonOnly)]`.
//!
//! Derived code opens a [`StructWalker`] for each struct or struct variant it
//! serializes and feeds it one field at a time. On entry the walker registers
//! the type's own allow-list and decides how to route the container:
//!
//! - **filtered**: the type has a rule or the instance has a staged rule.
//!   Every field goes through [`FilterPass::write_field`].
//! - **unfiltered**: every field is written, but field allow-lists are still
//!   staged on the field values (and cleared afterwards) so nested values are
//!   restricted.

use serde::{
    ser::{SerializeStruct, SerializeStructVariant},
    Serialize, Serializer,
};

use super::filterable::Filterable;
use crate::{
    allow_list::FieldAllowList,
    filter::{FieldSink, FieldVisit, FilterPass, Identity, TypeKey},
};

/// Drives the fields of one container through a pass.
pub struct StructWalker<'p, 'f, W> {
    pass: &'p FilterPass<'f>,
    container: Identity,
    declaring_type: TypeKey,
    type_rule: Option<&'static [&'static str]>,
    filtered: bool,
    sink: W,
}

/// Opens a walker over `serializer.serialize_struct(name, len)`.
///
/// `len` is the declared field count. Formats that rely on it must support
/// `skip_field` for omitted fields.
pub fn begin_struct<'p, 'f, C, S>(
    pass: &'p FilterPass<'f>,
    container: &C,
    type_rule: Option<&'static [&'static str]>,
    serializer: S,
    name: &'static str,
    len: usize,
) -> Result<StructWalker<'p, 'f, StructSink<S::SerializeStruct>>, S::Error>
where
    C: ?Sized,
    S: Serializer,
{
    let state = serializer.serialize_struct(name, len)?;
    Ok(StructWalker::new(pass, container, type_rule, StructSink(state)))
}

/// Opens a walker over `serializer.serialize_struct_variant(..)`. The declaring
/// type is the enum.
#[allow(clippy::too_many_arguments)]
pub fn begin_struct_variant<'p, 'f, C, S>(
    pass: &'p FilterPass<'f>,
    container: &C,
    type_rule: Option<&'static [&'static str]>,
    serializer: S,
    name: &'static str,
    variant_index: u32,
    variant: &'static str,
    len: usize,
) -> Result<StructWalker<'p, 'f, VariantSink<S::SerializeStructVariant>>, S::Error>
where
    C: ?Sized,
    S: Serializer,
{
    let state = serializer.serialize_struct_variant(name, variant_index, variant, len)?;
    Ok(StructWalker::new(pass, container, type_rule, VariantSink(state)))
}

impl<'p, 'f, W> StructWalker<'p, 'f, W>
where
    W: FieldSink,
{
    fn new<C: ?Sized>(
        pass: &'p FilterPass<'f>,
        container: &C,
        type_rule: Option<&'static [&'static str]>,
        sink: W,
    ) -> Self {
        let declaring_type = TypeKey::of::<C>();
        if let Some(fields) = type_rule {
            pass.filter().register(declaring_type, fields.iter().copied());
        }
        let filtered = pass.participates_in_filtering(container);
        Self {
            pass,
            container: Identity::of(container),
            declaring_type,
            type_rule,
            filtered,
            sink,
        }
    }

    /// Whether this container is routed through field decisions.
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Walks one field. `field_rule` is the allow-list declared on the field.
    pub fn field<V>(
        &mut self,
        name: &'static str,
        value: &V,
        field_rule: Option<&[&str]>,
    ) -> Result<(), W::Error>
    where
        V: Filterable + ?Sized,
    {
        if self.filtered {
            let visit = FieldVisit::from_parts(self.container, self.declaring_type, name, value)
                .with_type_rule(self.type_rule)
                .with_field_rule(field_rule);
            self.pass.write_field(&mut self.sink, &visit)?;
            return Ok(());
        }

        let instances = self.pass.instances();
        if let Some(rule) = field_rule.and_then(|f| FieldAllowList::new(f.iter().copied())) {
            value.stage_rule(instances, &rule);
        }
        self.sink.write(name, &self.pass.filtered(value))?;
        value.clear_rule(instances);
        Ok(())
    }

    pub fn end(self) -> Result<W::Ok, W::Error> {
        self.sink.end()
    }
}

/// [`FieldSink`] over a serde struct serializer.
pub struct StructSink<T>(T);

impl<T> FieldSink for StructSink<T>
where
    T: SerializeStruct,
{
    type Ok = T::Ok;
    type Error = T::Error;

    fn write<V>(&mut self, name: &'static str, value: &V) -> Result<(), Self::Error>
    where
        V: Serialize + ?Sized,
    {
        self.0.serialize_field(name, value)
    }

    fn skip(&mut self, name: &'static str) -> Result<(), Self::Error> {
        self.0.skip_field(name)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.0.end()
    }
}

/// [`FieldSink`] over a serde struct-variant serializer.
pub struct VariantSink<T>(T);

impl<T> FieldSink for VariantSink<T>
where
    T: SerializeStructVariant,
{
    type Ok = T::Ok;
    type Error = T::Error;

    fn write<V>(&mut self, name: &'static str, value: &V) -> Result<(), Self::Error>
    where
        V: Serialize + ?Sized,
    {
        self.0.serialize_field(name, value)
    }

    fn skip(&mut self, name: &'static str) -> Result<(), Self::Error> {
        self.0.skip_field(name)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.0.end()
    }
}
