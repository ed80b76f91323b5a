//! Shared field code generation for struct and enum derivation.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, Result};

use crate::{
    crate_root,
    generics::collect_generics_from_type,
    strategy::{parse_field_options, AllowList, FieldOptions, Strategy},
};

/// Generics collected while processing the fields of one type.
pub(crate) struct DeriveContext<'a> {
    pub(crate) generics: &'a syn::Generics,
    pub(crate) walked_generics: &'a mut Vec<Ident>,
    pub(crate) plain_generics: &'a mut Vec<Ident>,
}

/// The value handed to the walker for a field.
///
/// `access` must evaluate to a reference to the field. Walked fields are passed
/// as is; `plain` fields are wrapped in `Plain`.
///
/// | Annotation | Value expression |
/// |------------|------------------|
/// | None / allow-list | `access` |
/// | `#[json_only(plain)]` | `&Plain(access)` |
pub(crate) fn generate_field_value(
    ctx: &mut DeriveContext<'_>,
    ty: &syn::Type,
    access: &TokenStream,
    span: Span,
    strategy: Strategy,
) -> TokenStream {
    match strategy {
        Strategy::Walk => {
            collect_generics_from_type(
                ty,
                ctx.generics,
                ctx.walked_generics,
                Some(&mut *ctx.plain_generics),
            );
            quote_spanned! { span => #access }
        }
        Strategy::Plain => {
            collect_generics_from_type(ty, ctx.generics, ctx.plain_generics, None);
            let root = crate_root();
            quote_spanned! { span => &#root::Plain(#access) }
        }
    }
}

/// Generates one `__walker.field(...)` call for a named field.
pub(crate) fn generate_field_walk(
    ctx: &mut DeriveContext<'_>,
    field: &syn::Field,
    access: &TokenStream,
) -> Result<TokenStream> {
    let span = field.span();
    let FieldOptions {
        strategy,
        rule,
        rename,
    } = parse_field_options(&field.attrs)?;

    let name = match (rename, &field.ident) {
        (Some(rename), _) => rename,
        (None, Some(ident)) => ident.unraw().to_string(),
        (None, None) => {
            return Err(syn::Error::new(span, "expected a named field"));
        }
    };

    let value = generate_field_value(ctx, &field.ty, access, span, strategy);
    let rule = match rule {
        Some(rule) => {
            let slice = rule.to_slice_tokens();
            quote! { ::core::option::Option::Some(#slice) }
        }
        None => quote! { ::core::option::Option::None },
    };

    Ok(quote_spanned! { span =>
        __walker.field(#name, #value, #rule)?;
    })
}

/// Rejects attributes that only make sense on named fields.
pub(crate) fn reject_field_rule(field: &syn::Field) -> Result<Strategy> {
    let options = parse_field_options(&field.attrs)?;
    if let Some(rule) = options.rule {
        return Err(syn::Error::new(
            rule.span(),
            "allow-lists on a newtype field are not supported; put them on the field holding this type",
        ));
    }
    if options.rename.is_some() {
        return Err(syn::Error::new(
            field.span(),
            "`rename` is only supported on named fields",
        ));
    }
    Ok(options.strategy)
}

/// `Some(&["a", "b"])` or `None`, typed as `Option<&'static [&'static str]>`.
pub(crate) fn type_rule_tokens(rule: Option<&AllowList>) -> TokenStream {
    match rule {
        Some(rule) => {
            let slice = rule.to_slice_tokens();
            quote! {
                const __TYPE_RULE: ::core::option::Option<&'static [&'static str]> =
                    ::core::option::Option::Some(#slice);
            }
        }
        None => quote! {
            const __TYPE_RULE: ::core::option::Option<&'static [&'static str]> =
                ::core::option::Option::None;
        },
    }
}
