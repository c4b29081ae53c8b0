//! Type introspection helpers.
//!
//! These utilities perform shallow inspection of `syn::Type` values to
//! recognise `Option<T>` and the collection types the loader rejects.

use syn::{GenericArgument, PathArguments, Type};

const COLLECTIONS: [&str; 3] = ["Vec", "HashMap", "BTreeMap"];

/// Final path segment of `ty`, if it is a path type.
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    let Type::Path(p) = ty else {
        return None;
    };
    p.path.segments.last()
}

/// Returns the inner type if `ty` is `Option<T>`.
///
/// The check is shallow and matches fully-qualified forms such as
/// `std::option::Option<T>`; `Option<Vec<T>>` yields `Vec<T>`.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    let last = last_segment(ty)?;
    if last.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Name of the collection wrapper if `ty` is `Vec`, `HashMap` or `BTreeMap`.
pub(crate) fn collection_name(ty: &Type) -> Option<&'static str> {
    let last = last_segment(ty)?;
    COLLECTIONS
        .into_iter()
        .find(|collection| last.ident == collection)
}
