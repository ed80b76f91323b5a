//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added only for generics that appear in field types:
//! `Filterable` for walked fields, `Serialize` for `plain` fields.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` fields are skipped when collecting generics. The marker
//! serializes as a unit struct whatever `T` is, so
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,
//! }
//! ```
//!
//! works for any `T`, including types that implement neither trait.
//!
//! ## Map Keys
//!
//! Map keys are written through `Serialize` and never walked, so generics in
//! the first argument of `HashMap` / `BTreeMap` are collected as map keys and
//! bounded like `plain` fields.

use syn::{parse_quote, Ident};

use crate::crate_root;

/// Collects the type parameters of `generics` that appear in `ty`.
///
/// With `map_keys` set, parameters found in map key position go there instead
/// of `result`.
pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
    mut map_keys: Option<&mut Vec<Ident>>,
) {
    match ty {
        syn::Type::Path(path) => {
            if let Some(segment) = path.path.segments.last() {
                if segment.ident == "PhantomData" {
                    return;
                }

                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    let is_map = segment.ident == "HashMap" || segment.ident == "BTreeMap";
                    let types = args.args.iter().filter_map(|arg| match arg {
                        syn::GenericArgument::Type(inner_ty) => Some(inner_ty),
                        _ => None,
                    });
                    for (position, inner_ty) in types.enumerate() {
                        match map_keys.as_deref_mut() {
                            Some(keys) if is_map && position == 0 => {
                                collect_generics_from_type(inner_ty, generics, keys, None);
                            }
                            keys => collect_generics_from_type(inner_ty, generics, result, keys),
                        }
                    }
                }

                push_param(&segment.ident, generics, result);
            }
        }
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result, map_keys);
        }
        syn::Type::Slice(slice) => {
            collect_generics_from_type(&slice.elem, generics, result, map_keys);
        }
        syn::Type::Array(array) => {
            collect_generics_from_type(&array.elem, generics, result, map_keys);
        }
        syn::Type::Paren(paren) => {
            collect_generics_from_type(&paren.elem, generics, result, map_keys);
        }
        syn::Type::Group(group) => {
            collect_generics_from_type(&group.elem, generics, result, map_keys);
        }
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result, map_keys.as_deref_mut());
            }
        }
        _ => {}
    }
}

fn push_param(ident: &Ident, generics: &syn::Generics, result: &mut Vec<Ident>) {
    for param in generics.type_params() {
        if *ident == param.ident && !result.iter().any(|g| g == &param.ident) {
            result.push(param.ident.clone());
        }
    }
}

/// Adds `Filterable` bounds to generic parameters used in walked fields.
pub(crate) fn add_walked_bounds(mut generics: syn::Generics, used_generics: &[Ident]) -> syn::Generics {
    let root = crate_root();
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#root::Filterable));
        }
    }
    generics
}

/// Adds `Serialize` bounds to generic parameters used in `plain` fields.
pub(crate) fn add_plain_bounds(mut generics: syn::Generics, used_generics: &[Ident]) -> syn::Generics {
    let root = crate_root();
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#root::__private::Serialize));
        }
    }
    generics
}
