//! Enum-specific `Filterable` derivation.
//!
//! This module generates one match arm per variant:
//!
//! | Variant | Serialized as | Staging |
//! |---------|---------------|---------|
//! | unit | `serialize_unit_variant` | the enum value |
//! | newtype | `serialize_newtype_variant`, inner value walked | the inner value |
//! | named fields | struct variant through a `StructWalker` | the enum value |
//!
//! The enum is the declaring type of every struct-variant field, so a
//! type-level allow-list on the enum governs all of them.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{ext::IdentExt, spanned::Spanned, DataEnum, Fields, Result};

use crate::{
    crate_root,
    strategy::AllowList,
    transform::{
        generate_field_value, generate_field_walk, reject_field_rule, type_rule_tokens,
        DeriveContext,
    },
    Staging,
};

pub(crate) struct EnumDeriveOutput {
    pub(crate) serialize_body: TokenStream,
    pub(crate) staging: Option<Staging>,
    pub(crate) walked_generics: Vec<Ident>,
    pub(crate) plain_generics: Vec<Ident>,
}

/// Output collected across variants.
#[derive(Default)]
struct Arms {
    serialize: Vec<TokenStream>,
    stage: Vec<TokenStream>,
    clear: Vec<TokenStream>,
    has_newtype: bool,
    has_named: bool,
}

pub(crate) fn derive_enum(
    name: &Ident,
    data: DataEnum,
    generics: &syn::Generics,
    type_rule: Option<&AllowList>,
) -> Result<EnumDeriveOutput> {
    let mut walked_generics = Vec::new();
    let mut plain_generics = Vec::new();
    let mut ctx = DeriveContext {
        generics,
        walked_generics: &mut walked_generics,
        plain_generics: &mut plain_generics,
    };
    let name_str = name.unraw().to_string();
    let mut arms = Arms::default();

    for (index, variant) in data.variants.iter().enumerate() {
        let index = u32::try_from(index)
            .map_err(|_| syn::Error::new(variant.span(), "too many variants"))?;
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.unraw().to_string();

        match &variant.fields {
            Fields::Unit => {
                arms.serialize.push(quote! {
                    Self::#variant_ident => __serializer.serialize_unit_variant(
                        #name_str,
                        #index,
                        #variant_name,
                    )
                });
                arms.stage
                    .push(quote! { Self::#variant_ident => __rules.stage(self, __rule) });
                arms.clear
                    .push(quote! { Self::#variant_ident => __rules.clear(self) });
            }
            Fields::Unnamed(fields) => {
                if fields.unnamed.len() != 1 {
                    return Err(syn::Error::new(
                        fields.span(),
                        "`JsonOnly` supports tuple variants with exactly one field",
                    ));
                }
                let root = crate_root();
                let field = &fields.unnamed[0];
                let strategy = reject_field_rule(field)?;
                let value = generate_field_value(
                    &mut ctx,
                    &field.ty,
                    &quote! { __value },
                    field.span(),
                    strategy,
                );
                arms.serialize.push(quote! {
                    Self::#variant_ident(__value) => __serializer.serialize_newtype_variant(
                        #name_str,
                        #index,
                        #variant_name,
                        &__pass.filtered(#value),
                    )
                });
                arms.stage.push(quote! {
                    Self::#variant_ident(__value) => #root::Filterable::stage_rule(#value, __rules, __rule)
                });
                arms.clear.push(quote! {
                    Self::#variant_ident(__value) => #root::Filterable::clear_rule(#value, __rules)
                });
                arms.has_newtype = true;
            }
            Fields::Named(fields) => {
                let root = crate_root();
                let len = fields.named.len();
                let mut bindings = Vec::new();
                let mut walks = Vec::new();
                for (position, field) in fields.named.iter().enumerate() {
                    let ident = &field.ident;
                    let binding = format_ident!("__field{}", position);
                    walks.push(generate_field_walk(&mut ctx, field, &quote! { #binding })?);
                    bindings.push(quote! { #ident: #binding });
                }
                arms.serialize.push(quote! {
                    Self::#variant_ident { #(#bindings),* } => {
                        #[allow(unused_mut)]
                        let mut __walker = #root::__private::begin_struct_variant(
                            __pass,
                            self,
                            __TYPE_RULE,
                            __serializer,
                            #name_str,
                            #index,
                            #variant_name,
                            #len,
                        )?;
                        #(#walks)*
                        __walker.end()
                    }
                });
                arms.stage
                    .push(quote! { Self::#variant_ident { .. } => __rules.stage(self, __rule) });
                arms.clear
                    .push(quote! { Self::#variant_ident { .. } => __rules.clear(self) });
                arms.has_named = true;
            }
        }
    }

    if !arms.has_named {
        if let Some(rule) = type_rule {
            return Err(syn::Error::new(
                rule.span(),
                "type-level #[json_only] on an enum needs at least one variant with named fields",
            ));
        }
    }

    let Arms {
        serialize,
        stage,
        clear,
        has_newtype,
        has_named,
    } = arms;

    let type_rule = has_named.then(|| type_rule_tokens(type_rule));
    let serialize_body = if serialize.is_empty() {
        quote! {
            let _ = (__pass, __serializer);
            match *self {}
        }
    } else if !has_newtype && !has_named {
        quote! {
            let _ = __pass;
            match self {
                #(#serialize),*
            }
        }
    } else {
        quote! {
            #type_rule
            match self {
                #(#serialize),*
            }
        }
    };

    let staging = has_newtype.then(|| Staging {
        stage_body: quote! {
            match self {
                #(#stage),*
            }
        },
        clear_body: quote! {
            match self {
                #(#clear),*
            }
        },
    });

    Ok(EnumDeriveOutput {
        serialize_body,
        staging,
        walked_generics,
        plain_generics,
    })
}
