//! Struct-specific `Filterable` derivation.
//!
//! Named structs open a `StructWalker` and feed it every field. Newtype structs
//! are transparent: they serialize as a serde newtype and forward staging to
//! the inner value. Unit structs serialize as a unit struct.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, Result};

use crate::{
    crate_root,
    strategy::AllowList,
    transform::{
        generate_field_value, generate_field_walk, reject_field_rule, type_rule_tokens,
        DeriveContext,
    },
    Staging,
};

pub(crate) struct StructDeriveOutput {
    pub(crate) serialize_body: TokenStream,
    pub(crate) staging: Option<Staging>,
    pub(crate) walked_generics: Vec<Ident>,
    pub(crate) plain_generics: Vec<Ident>,
}

pub(crate) fn derive_struct(
    name: &Ident,
    data: DataStruct,
    generics: &syn::Generics,
    type_rule: Option<&AllowList>,
) -> Result<StructDeriveOutput> {
    let mut walked_generics = Vec::new();
    let mut plain_generics = Vec::new();
    let mut ctx = DeriveContext {
        generics,
        walked_generics: &mut walked_generics,
        plain_generics: &mut plain_generics,
    };
    let name_str = name.unraw().to_string();

    let (serialize_body, staging) = match data.fields {
        Fields::Named(fields) => (
            derive_named_struct(&name_str, &fields, &mut ctx, type_rule)?,
            None,
        ),
        Fields::Unnamed(fields) => {
            reject_type_rule(type_rule, "newtype structs")?;
            let (body, staging) = derive_newtype_struct(&name_str, &fields, &mut ctx)?;
            (body, Some(staging))
        }
        Fields::Unit => {
            reject_type_rule(type_rule, "unit structs")?;
            (
                quote! {
                    let _ = __pass;
                    __serializer.serialize_unit_struct(#name_str)
                },
                None,
            )
        }
    };

    Ok(StructDeriveOutput {
        serialize_body,
        staging,
        walked_generics,
        plain_generics,
    })
}

pub(crate) fn reject_type_rule(type_rule: Option<&AllowList>, shape: &str) -> Result<()> {
    match type_rule {
        Some(rule) => Err(syn::Error::new(
            rule.span(),
            format!("type-level #[json_only] is not supported on {shape}: they have no named fields"),
        )),
        None => Ok(()),
    }
}

fn derive_named_struct(
    name: &str,
    fields: &syn::FieldsNamed,
    ctx: &mut DeriveContext<'_>,
    type_rule: Option<&AllowList>,
) -> Result<TokenStream> {
    let root = crate_root();
    let type_rule = type_rule_tokens(type_rule);
    let len = fields.named.len();

    let mut walks = Vec::new();
    for field in &fields.named {
        let ident = &field.ident;
        walks.push(generate_field_walk(ctx, field, &quote! { &self.#ident })?);
    }

    Ok(quote! {
        #type_rule
        #[allow(unused_mut)]
        let mut __walker = #root::__private::begin_struct(
            __pass,
            self,
            __TYPE_RULE,
            __serializer,
            #name,
            #len,
        )?;
        #(#walks)*
        __walker.end()
    })
}

fn derive_newtype_struct(
    name: &str,
    fields: &syn::FieldsUnnamed,
    ctx: &mut DeriveContext<'_>,
) -> Result<(TokenStream, Staging)> {
    if fields.unnamed.len() != 1 {
        return Err(syn::Error::new(
            fields.span(),
            "`JsonOnly` supports tuple structs with exactly one field",
        ));
    }
    let root = crate_root();
    let field = &fields.unnamed[0];
    let strategy = reject_field_rule(field)?;
    let value = generate_field_value(ctx, &field.ty, &quote! { &self.0 }, field.span(), strategy);

    let body = quote! {
        __serializer.serialize_newtype_struct(#name, &__pass.filtered(#value))
    };
    let staging = Staging {
        stage_body: quote! { #root::Filterable::stage_rule(#value, __rules, __rule); },
        clear_body: quote! { #root::Filterable::clear_rule(#value, __rules); },
    };
    Ok((body, staging))
}
