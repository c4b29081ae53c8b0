//! Input parsing for the `TieredConfig` derive macro.
//!
//! Gathers the struct identifier, fields and attribute metadata in one pass
//! and validates field types so expansion can fail fast.

use syn::{Data, DeriveInput, Fields, Type};

use super::{
    FieldAttrs, StructAttrs, collection_name, option_inner, parse_field_attrs, parse_struct_attrs,
};

/// One named field with its parsed attributes.
pub(crate) struct ParsedField {
    pub member: syn::Ident,
    pub name: String,
    pub attrs: FieldAttrs,
}

/// Everything the generator needs from the derive input.
pub(crate) struct ParsedInput {
    pub fields: Vec<ParsedField>,
    pub struct_attrs: StructAttrs,
}

/// Gathers information from the user-provided struct.
///
/// Rejects enums, unions, tuple and unit structs, and active fields whose
/// type the loader cannot populate.
pub(crate) fn parse_input(input: &DeriveInput) -> syn::Result<ParsedInput> {
    let struct_attrs = parse_struct_attrs(&input.attrs)?;
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    data.struct_token,
                    "TieredConfig requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "TieredConfig can only be derived for structs",
            ));
        }
    };

    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let Some(member) = field.ident.clone() else {
            continue;
        };
        let name = member.to_string().trim_start_matches("r#").to_owned();
        let attrs = parse_field_attrs(&field.attrs, &name)?;
        if !attrs.ignored {
            validate_type(&field.ty)?;
        }
        fields.push(ParsedField {
            member,
            name,
            attrs,
        });
    }
    Ok(ParsedInput {
        fields,
        struct_attrs,
    })
}

fn validate_type(ty: &Type) -> syn::Result<()> {
    let inner = option_inner(ty);
    if inner.and_then(option_inner).is_some() {
        return Err(syn::Error::new_spanned(
            ty,
            "nested `Option` fields are not supported",
        ));
    }
    if let Some(collection) = collection_name(inner.unwrap_or(ty)) {
        return Err(syn::Error::new_spanned(
            ty,
            format!(
                "`{collection}` fields are not supported; mark the field \
                 `#[tiered_config(ignored)]` to leave it untouched"
            ),
        ));
    }
    Ok(())
}
