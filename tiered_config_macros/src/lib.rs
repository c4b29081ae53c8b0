//! Procedural macros for `tiered_config`.
//!
//! `#[derive(TieredConfig)]` turns a struct with named fields into a
//! configuration record: it implements `tiered_config::Specification` with
//! one field entry per struct field, and `tiered_config::TieredConfig` with
//! the struct's default prefix.
//!
//! Struct attributes, inside `#[tiered_config(...)]`:
//!
//! - `prefix = "APP_"` sets the environment prefix; a missing trailing `_`
//!   is added.
//! - `crate = "path"` points generated code at an aliased dependency.
//!
//! Field attributes:
//!
//! - `env = "KEY"` or bare `env` (the field name in `SCREAMING_SNAKE_CASE`).
//! - `secret = "reference"`.
//! - `flag = "name"` or bare `flag` (the field name in `kebab-case`).
//! - `default = <literal>`: a string, integer, float or bool literal.
//! - `required` or `required = <bool>`.
//! - `ignored` or `skip`: the loader never touches the field.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro for `tiered_config::TieredConfig`.
#[proc_macro_derive(TieredConfig, attributes(tiered_config))]
pub fn derive_tiered_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
