//! Parsing of `#[tiered_config(...)]` attributes.

use heck::{ToKebabCase, ToShoutySnakeCase};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Lit, Token};

mod input;
mod literals;
#[cfg(test)]
mod tests;
mod type_utils;

pub(crate) use input::{ParsedField, ParsedInput, parse_input};
use literals::{default_literal, lit_bool, lit_str};
pub(crate) use type_utils::{collection_name, option_inner};

/// Struct-level attributes.
#[derive(Default, Clone)]
pub(crate) struct StructAttrs {
    pub prefix: Option<String>,
    /// Overrides the generated crate path for dependency aliasing.
    pub crate_path: Option<syn::Path>,
}

/// Field-level attributes, with bare `env` and `flag` already expanded to
/// names derived from the field.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldAttrs {
    pub env: Option<String>,
    pub secret: Option<String>,
    pub flag: Option<String>,
    pub default: Option<String>,
    pub required: bool,
    pub ignored: bool,
}

/// Iterate all `#[tiered_config(...)]` attributes once and apply a callback.
fn parse_tiered_config<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs
        .iter()
        .filter(|a| a.path().is_ident("tiered_config"))
    {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

fn meta_key(meta: &ParseNestedMeta) -> String {
    meta.path
        .get_ident()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn parse_prefix(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit = meta.value()?.parse::<Lit>()?;
    match lit {
        Lit::Str(s) => {
            let mut value = s.value();
            if !value.is_empty() && !value.ends_with('_') {
                value.push('_');
            }
            Ok(value)
        }
        other => Err(syn::Error::new(other.span(), "prefix must be a string")),
    }
}

/// Extracts `#[tiered_config(...)]` metadata applied to a struct.
///
/// Recognises `prefix` and `crate`; any other key is a compile error.
pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_tiered_config(attrs, |meta| match meta_key(meta).as_str() {
        "prefix" => {
            out.prefix = Some(parse_prefix(meta)?);
            Ok(())
        }
        "crate" => {
            let s = lit_str(meta, "crate")?;
            let path: syn::Path =
                syn::parse_str(&s.value()).map_err(|e| syn::Error::new(s.span(), e))?;
            out.crate_path = Some(path);
            Ok(())
        }
        _ => Err(meta.error(
            "unknown tiered_config struct attribute; expected `prefix` or `crate`",
        )),
    })?;
    Ok(out)
}

/// Parses `key = "value"` or a bare `key`, falling back to `derived`.
fn str_or_derived(
    meta: &ParseNestedMeta,
    key: &str,
    derived: impl FnOnce() -> String,
) -> syn::Result<String> {
    if meta.input.peek(Token![=]) {
        Ok(lit_str(meta, key)?.value())
    } else {
        Ok(derived())
    }
}

/// Parses `key = bool` or a bare `key` meaning `true`.
fn flag_or_bool(meta: &ParseNestedMeta, key: &str) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        lit_bool(meta, key)
    } else {
        Ok(true)
    }
}

/// Parses field-level `#[tiered_config(...)]` attributes.
///
/// `name` is the field's declared name, used to derive bare `env` and `flag`
/// names.
pub(crate) fn parse_field_attrs(attrs: &[Attribute], name: &str) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_tiered_config(attrs, |meta| {
        match meta_key(meta).as_str() {
            "env" => out.env = Some(str_or_derived(meta, "env", || name.to_shouty_snake_case())?),
            "flag" => out.flag = Some(str_or_derived(meta, "flag", || name.to_kebab_case())?),
            "secret" => out.secret = Some(lit_str(meta, "secret")?.value()),
            "default" => out.default = Some(default_literal(meta)?),
            "required" => out.required = flag_or_bool(meta, "required")?,
            "ignored" | "skip" => out.ignored = flag_or_bool(meta, "ignored")?,
            _ => {
                return Err(meta.error(
                    "unknown tiered_config field attribute; expected one of `env`, `secret`, \
                     `flag`, `default`, `required`, `ignored` or `skip`",
                ));
            }
        }
        Ok(())
    })?;
    Ok(out)
}
