//! Parsing of `#[json_only(...)]` field attributes.
//!
//! This module maps attribute syntax to walking decisions and produces
//! structured errors for invalid forms.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Ident, LitStr, Meta, Result, Token,
};

/// A non-empty list of field-name literals, as written in an attribute.
#[derive(Clone, Debug)]
pub(crate) struct AllowList {
    span: Span,
    entries: Vec<String>,
}

impl AllowList {
    pub(crate) fn from_literals(
        span: Span,
        literals: impl IntoIterator<Item = LitStr>,
    ) -> Result<Self> {
        let mut entries = Vec::new();
        for literal in literals {
            let value = literal.value();
            if value.is_empty() {
                return Err(syn::Error::new(
                    literal.span(),
                    "field names in #[json_only] must not be empty",
                ));
            }
            entries.push(value);
        }
        if entries.is_empty() {
            return Err(syn::Error::new(
                span,
                "empty allow-list: name at least one field",
            ));
        }
        Ok(Self { span, entries })
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[String] {
        &self.entries
    }

    pub(crate) fn span(&self) -> Span {
        self.span
    }

    /// `&["a", "b"]`, usable where `&'static [&'static str]` is expected.
    pub(crate) fn to_slice_tokens(&self) -> TokenStream {
        let entries = &self.entries;
        quote! { &[#(#entries),*] }
    }
}

/// How a field's value is serialized.
///
/// | Attribute | Strategy | Behavior |
/// |-----------|----------|----------|
/// | None / allow-list | `Walk` | Serialize through the pass, staging any allow-list |
/// | `#[json_only(plain)]` | `Plain` | Serialize through `serde::Serialize` |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// The field type implements `Filterable`.
    Walk,
    /// The field type only implements `serde::Serialize`.
    Plain,
}

#[derive(Clone, Debug)]
pub(crate) struct FieldOptions {
    pub(crate) strategy: Strategy,
    pub(crate) rule: Option<AllowList>,
    pub(crate) rename: Option<String>,
}

enum FieldArg {
    Field(LitStr),
    Plain(Span),
    Rename(Span, LitStr),
}

impl Parse for FieldArg {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Field(input.parse()?));
        }
        let ident: Ident = input.parse()?;
        if ident == "plain" {
            Ok(Self::Plain(ident.span()))
        } else if ident == "rename" {
            input.parse::<Token![=]>()?;
            Ok(Self::Rename(ident.span(), input.parse()?))
        } else {
            Err(syn::Error::new(
                ident.span(),
                format!(
                    "unknown field option `{ident}`; expected field name literals, `plain` or `rename = \"...\"`"
                ),
            ))
        }
    }
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut plain: Option<Span> = None;
    let mut rule: Option<AllowList> = None;
    let mut rename: Option<String> = None;

    for attr in attrs {
        if !attr.path().is_ident("json_only") {
            continue;
        }

        let list = match &attr.meta {
            Meta::List(list) => list,
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected field names, `plain` or `rename = \"...\"` in #[json_only(...)]",
                ));
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[json_only]",
                ));
            }
        };

        let args = list.parse_args_with(Punctuated::<FieldArg, Token![,]>::parse_terminated)?;
        let mut literals = Vec::new();
        for arg in args {
            match arg {
                FieldArg::Field(literal) => literals.push(literal),
                FieldArg::Plain(span) => {
                    if plain.is_some() {
                        return Err(syn::Error::new(span, "`plain` specified more than once"));
                    }
                    plain = Some(span);
                }
                FieldArg::Rename(span, literal) => {
                    if rename.is_some() {
                        return Err(syn::Error::new(span, "`rename` specified more than once"));
                    }
                    if literal.value().is_empty() {
                        return Err(syn::Error::new(
                            literal.span(),
                            "`rename` must not be empty",
                        ));
                    }
                    rename = Some(literal.value());
                }
            }
        }

        if !literals.is_empty() {
            if rule.is_some() {
                return Err(syn::Error::new(
                    attr.span(),
                    "multiple allow-lists specified on the same field",
                ));
            }
            rule = Some(AllowList::from_literals(attr.span(), literals)?);
        }
    }

    if let (Some(span), Some(_)) = (plain, &rule) {
        return Err(syn::Error::new(
            span,
            "`plain` fields are not walked, so they cannot carry an allow-list",
        ));
    }

    Ok(FieldOptions {
        strategy: if plain.is_some() {
            Strategy::Plain
        } else {
            Strategy::Walk
        },
        rule,
        rename,
    })
}
