//! Container-level attribute parsing for `#[derive(JsonOnly)]`.
//!
//! This module handles attributes on the struct/enum itself, not on fields.

use syn::{punctuated::Punctuated, spanned::Spanned, Attribute, LitStr, Meta, Result, Token};

use crate::strategy::AllowList;

/// Options parsed from container-level `#[json_only(...)]` attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// The type's allow-list, if declared.
    pub(crate) type_rule: Option<AllowList>,
}

/// Parses container-level `#[json_only(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("json_only") {
            continue;
        }

        let list = match &attr.meta {
            Meta::List(list) => list,
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected a list of field names, e.g. #[json_only(\"id\", \"owner.name\")]",
                ));
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[json_only]",
                ));
            }
        };

        if options.type_rule.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "multiple #[json_only] attributes specified on the same type",
            ));
        }

        let literals = list
            .parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)
            .map_err(|err| {
                syn::Error::new(
                    err.span(),
                    "container-level #[json_only] only accepts string literals naming fields",
                )
            })?;
        options.type_rule = Some(AllowList::from_literals(attr.span(), literals)?);
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_returns_defaults() {
        let attrs = parse_attrs(quote! {});
        let options = parse_container_options(&attrs).unwrap();
        assert!(options.type_rule.is_none());
    }

    #[test]
    fn field_names_are_parsed_in_order() {
        let attrs = parse_attrs(quote! { #[json_only("id", "owner.name")] });
        let options = parse_container_options(&attrs).unwrap();
        let rule = options.type_rule.unwrap();
        assert_eq!(rule.entries(), ["id", "owner.name"]);
    }

    #[test]
    fn bare_attribute_errors() {
        let attrs = parse_attrs(quote! { #[json_only] });
        let result = parse_container_options(&attrs);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("expected a list of field names"));
    }

    #[test]
    fn non_literal_entries_error() {
        let attrs = parse_attrs(quote! { #[json_only(id)] });
        let result = parse_container_options(&attrs);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("only accepts string literals"));
    }

    #[test]
    fn empty_list_errors() {
        let attrs = parse_attrs(quote! { #[json_only()] });
        let result = parse_container_options(&attrs);
        assert!(result.unwrap_err().to_string().contains("empty allow-list"));
    }

    #[test]
    fn repeated_attribute_errors() {
        let attrs = parse_attrs(quote! {
            #[json_only("a")]
            #[json_only("b")]
        });
        let result = parse_container_options(&attrs);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("multiple #[json_only] attributes"));
    }

    #[test]
    fn other_attributes_ignored() {
        let attrs = parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(rename_all = "camelCase")]
        });
        let options = parse_container_options(&attrs).unwrap();
        assert!(options.type_rule.is_none());
    }
}
