//! Expansion of `#[derive(TieredConfig)]`.

mod generate;
mod parse;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::DeriveInput;

/// Parses and validates `input`, then generates the trait implementations.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = parse::parse_input(input)?;
    let krate = runtime_path(parsed.struct_attrs.crate_path.as_ref());
    Ok(generate::generate(input, &parsed, &krate))
}

/// Path of the runtime crate in generated code; `crate = "..."` overrides it
/// for renamed dependencies.
fn runtime_path(alias: Option<&syn::Path>) -> TokenStream {
    alias.map_or_else(|| quote! { ::tiered_config }, ToTokens::to_token_stream)
}
