//! Derive macros for `json-only`.
//!
//! This crate generates the walking code behind `#[derive(JsonOnly)]`. It:
//! - reads `#[json_only(...)]` container and field attributes
//! - emits a `Filterable` implementation that drives a `StructWalker`
//!
//! It does **not** decide which fields are written. Decisions are made at
//! runtime by the `json_only` filtering pass.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::{Ident, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod generics;
mod strategy;
mod transform;
use container::{parse_container_options, ContainerOptions};
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use generics::{add_plain_bounds, add_walked_bounds};

/// Derives `json_only::Filterable` for structs and enums.
///
/// # Container Attributes
///
/// - `#[json_only("a", "b.c")]`: the type's allow-list. Registered with the
///   filter the first time a value of this type is walked, and intersected
///   with any rule already registered for the type. Entries with a dot restrict
///   the value of the named field. Only allowed on named-field structs and
///   enums.
///
/// # Field Attributes
///
/// - **No annotation**: the field is walked, so its own type must implement
///   `Filterable`.
/// - `#[json_only("x", "y.z")]`: restricts the value held by this field for
///   one write. Sequences and maps apply it to every element.
/// - `#[json_only(plain)]`: serializes the field through `serde::Serialize`
///   without descending into it. Use this for external types.
/// - `#[json_only(rename = "n")]`: the name written to the output and matched
///   against allow-lists.
///
/// Supported shapes: named structs, newtype structs, unit structs, and enums
/// with unit, newtype, or named-field variants. Unions are rejected at compile
/// time.
#[proc_macro_derive(JsonOnly, attributes(json_only))]
pub fn derive_json_only(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the json-only crate root.
///
/// Handles crate renaming (e.g., `filters = { package = "json-only", ... }`).
/// Inside json-only itself the root is still `::json_only`, which resolves
/// through its `extern crate self` alias.
fn crate_root() -> TokenStream {
    match crate_name("json-only") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::json_only },
    }
}

struct DeriveOutput {
    serialize_body: TokenStream,
    staging: Option<Staging>,
    walked_generics: Vec<Ident>,
    plain_generics: Vec<Ident>,
}

/// Overrides for `stage_rule` / `clear_rule`, emitted for types that forward
/// staging to an inner value.
pub(crate) struct Staging {
    pub(crate) stage_body: TokenStream,
    pub(crate) clear_body: TokenStream,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions { type_rule } = parse_container_options(&attrs)?;

    let crate_root = crate_root();

    let output = match data {
        Data::Struct(data) => {
            let output = derive_struct(&ident, data, &generics, type_rule.as_ref())?;
            DeriveOutput {
                serialize_body: output.serialize_body,
                staging: output.staging,
                walked_generics: output.walked_generics,
                plain_generics: output.plain_generics,
            }
        }
        Data::Enum(data) => {
            let output = derive_enum(&ident, data, &generics, type_rule.as_ref())?;
            DeriveOutput {
                serialize_body: output.serialize_body,
                staging: output.staging,
                walked_generics: output.walked_generics,
                plain_generics: output.plain_generics,
            }
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`JsonOnly` cannot be derived for unions",
            ));
        }
    };

    let bounded = add_walked_bounds(generics, &output.walked_generics);
    let bounded = add_plain_bounds(bounded, &output.plain_generics);
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    let serialize_body = &output.serialize_body;
    let staging_impl = output.staging.map(|staging| {
        let Staging {
            stage_body,
            clear_body,
        } = staging;
        quote! {
            fn stage_rule(
                &self,
                __rules: &#crate_root::InstanceRuleTable,
                __rule: &#crate_root::FieldAllowList,
            ) {
                #stage_body
            }

            fn clear_rule(&self, __rules: &#crate_root::InstanceRuleTable) {
                #clear_body
            }
        }
    });

    Ok(quote! {
        impl #impl_generics #crate_root::Filterable for #ident #ty_generics #where_clause {
            fn serialize_filtered<__S>(
                &self,
                __pass: &#crate_root::FilterPass<'_>,
                __serializer: __S,
            ) -> ::core::result::Result<__S::Ok, __S::Error>
            where
                __S: #crate_root::__private::Serializer,
            {
                #serialize_body
            }

            #staging_impl
        }
    })
}
