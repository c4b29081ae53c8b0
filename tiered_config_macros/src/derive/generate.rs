//! Code generation for `#[derive(TieredConfig)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use super::parse::{ParsedField, ParsedInput};

/// Builds one `FieldEntry` expression.
fn field_entry(field: &ParsedField, krate: &TokenStream) -> TokenStream {
    let name = &field.name;
    if field.attrs.ignored {
        return quote! { #krate::FieldEntry::ignored(#name) };
    }
    let member = &field.member;
    let attrs = &field.attrs;
    let env = attrs.env.as_ref().map(|key| quote! { .env(#key) });
    let secret = attrs.secret.as_ref().map(|reference| quote! { .secret(#reference) });
    let flag = attrs.flag.as_ref().map(|flag| quote! { .flag(#flag) });
    let default = attrs.default.as_ref().map(|literal| quote! { .default(#literal) });
    let required = attrs.required.then(|| quote! { .required() });
    quote! {
        #krate::FieldEntry::new(#name, &mut self.#member)
            #env #secret #flag #default #required
    }
}

/// Generates the `Specification` and `TieredConfig` implementations.
pub(crate) fn generate(
    input: &DeriveInput,
    parsed: &ParsedInput,
    krate: &TokenStream,
) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let entries = parsed.fields.iter().map(|field| field_entry(field, krate));
    let prefix = parsed.struct_attrs.prefix.as_deref().unwrap_or_default();
    quote! {
        impl #impl_generics #krate::Specification for #ident #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<#krate::FieldEntry<'_>> {
                ::std::vec![ #( #entries ),* ]
            }
        }

        impl #impl_generics #krate::TieredConfig for #ident #ty_generics #where_clause {
            fn prefix() -> &'static str {
                #prefix
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::parse::parse_input;
    use anyhow::{Result, anyhow};
    use syn::parse_quote;

    fn expand(input: &DeriveInput) -> Result<String> {
        let parsed = parse_input(input).map_err(|err| anyhow!(err))?;
        Ok(generate(input, &parsed, &quote! { ::tiered_config }).to_string())
    }

    #[test]
    fn emits_builder_chain_per_field() -> Result<()> {
        let input: DeriveInput = parse_quote! {
            #[tiered_config(prefix = "APP")]
            struct Demo {
                #[tiered_config(env, flag, default = 8080, required)]
                listen_port: u16,
                #[tiered_config(ignored)]
                cache: Vec<String>,
            }
        };
        let tokens = expand(&input)?;
        let entry = quote! {
            ::tiered_config::FieldEntry::new("listen_port", &mut self.listen_port)
                .env("LISTEN_PORT")
                .flag("listen-port")
                .default("8080")
                .required()
        }
        .to_string();
        let ignored = quote! { ::tiered_config::FieldEntry::ignored("cache") }.to_string();
        assert!(tokens.contains(&entry), "{tokens}");
        assert!(tokens.contains(&ignored), "{tokens}");
        assert!(tokens.contains("\"APP_\""), "{tokens}");
        Ok(())
    }

    #[test]
    fn forwards_generics() -> Result<()> {
        let input: DeriveInput = parse_quote! {
            struct Demo<T: Default> {
                #[tiered_config(skip)]
                marker: T,
            }
        };
        let tokens = expand(&input)?;
        let header = quote! {
            impl<T: Default> ::tiered_config::Specification for Demo<T>
        }
        .to_string();
        assert!(tokens.contains(&header), "{tokens}");
        Ok(())
    }
}
