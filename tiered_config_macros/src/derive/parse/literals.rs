//! Literal parsing helpers for derive attributes.

use syn::{Expr, ExprLit, ExprUnary, Lit, LitStr, UnOp};

/// Parses a literal from a field attribute using `extractor`.
fn parse_lit<T, F>(
    meta: &syn::meta::ParseNestedMeta,
    key: &str,
    expected: &str,
    extractor: F,
) -> syn::Result<T>
where
    F: FnOnce(Lit) -> Option<T>,
{
    let literal = meta.value()?.parse::<Lit>()?;
    let span = literal.span();
    extractor(literal).ok_or_else(|| syn::Error::new(span, format!("{key} must be a {expected}")))
}

/// Parses a string literal from a field attribute.
pub(crate) fn lit_str(meta: &syn::meta::ParseNestedMeta, key: &str) -> syn::Result<LitStr> {
    parse_lit(meta, key, "string", |lit| match lit {
        Lit::Str(s) => Some(s),
        _ => None,
    })
}

/// Parses a boolean literal from a field attribute.
pub(crate) fn lit_bool(meta: &syn::meta::ParseNestedMeta, key: &str) -> syn::Result<bool> {
    parse_lit(meta, key, "bool", |lit| match lit {
        Lit::Bool(b) => Some(b.value),
        _ => None,
    })
}

/// Parses `default = <literal>` into the text the runtime coerces.
///
/// Strings keep their value, numbers their base-10 digits without suffix
/// (a leading `-` is allowed), and bools become `true`/`false`.
pub(crate) fn default_literal(meta: &syn::meta::ParseNestedMeta) -> syn::Result<String> {
    let expr = meta.value()?.parse::<Expr>()?;
    literal_text(&expr).ok_or_else(|| {
        syn::Error::new_spanned(
            &expr,
            "default must be a string, integer, float or bool literal",
        )
    })
}

fn literal_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Some(s.value()),
            Lit::Int(i) => Some(i.base10_digits().to_owned()),
            Lit::Float(f) => Some(f.base10_digits().to_owned()),
            Lit::Bool(b) => Some(b.value.to_string()),
            _ => None,
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match expr.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(i), ..
            }) => Some(format!("-{}", i.base10_digits())),
            Expr::Lit(ExprLit {
                lit: Lit::Float(f), ..
            }) => Some(format!("-{}", f.base10_digits())),
            _ => None,
        },
        Expr::Group(group) => literal_text(&group.expr),
        _ => None,
    }
}
