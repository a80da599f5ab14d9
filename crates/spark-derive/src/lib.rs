//! spark-derive
//!
//! `#[derive(Describe)]` - 構造体の宣言から `spark_core::typed::Describe` を実装する。
//!
//! フィールドの並びは宣言順、名前は serde と同じ規則
//! （`rename`, `rename_all`, `skip`）で決めるので、生成される型定義と
//! CBOR のマップのキーは常に一致します。
//!
//! # 使用例
//! ```ignore
//! #[derive(Serialize, Deserialize, Describe)]
//! #[serde(rename_all = "camelCase")]
//! struct EchoRequest {
//!     message_text: String,
//!     #[serde(rename = "Tags")]
//!     tags: Vec<String>,
//! }
//! ```

#![deny(unsafe_code)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

mod attrs;

use attrs::{ContainerAttrs, FieldAttrs};

#[proc_macro_derive(Describe, attributes(serde))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Describe cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Describe can only be derived for structs",
            ));
        }
    };

    let container = ContainerAttrs::parse(&input.attrs)?;
    let mut wire_names = Vec::new();
    let mut types = Vec::new();
    match fields {
        Fields::Named(named) => {
            for field in &named.named {
                let attrs = FieldAttrs::parse(&field.attrs)?;
                if attrs.skip {
                    continue;
                }
                let ident = field
                    .ident
                    .as_ref()
                    .map(|i| i.to_string())
                    .unwrap_or_default();
                let ident = ident.strip_prefix("r#").unwrap_or(&ident).to_string();
                let wire = match (attrs.rename, container.rename_all) {
                    (Some(rename), _) => rename,
                    (None, Some(rule)) => rule.apply(&ident),
                    (None, None) => ident,
                };
                wire_names.push(wire);
                types.push(&field.ty);
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Describe needs named fields",
            ));
        }
    }

    let ident = &input.ident;
    let name = ident.to_string();
    let build = if types.is_empty() {
        quote! { |_| {} }
    } else {
        quote! {
            |s| {
                #( s.field::<#types>(#wire_names); )*
            }
        }
    };

    Ok(quote! {
        impl ::spark_core::typed::Describe for #ident {
            fn descriptor() -> ::spark_core::domain::TypeDescriptor {
                ::spark_core::domain::TypeDescriptor::structure::<Self>(#name)
            }

            fn define(graph: &mut ::spark_core::domain::TypeGraph) {
                ::spark_core::typed::define_struct::<Self>(graph, #name, #build);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_to_string(input: DeriveInput) -> String {
        expand(&input).unwrap().to_string()
    }

    #[test]
    fn fields_follow_declaration_order_and_renames() {
        let out = expand_to_string(parse_quote! {
            #[serde(rename_all = "camelCase")]
            struct Renamed {
                #[serde(rename = "msg")]
                message: String,
                raw_data: Vec<u8>,
                #[serde(skip)]
                cache: u32,
            }
        });

        let msg = out.find("\"msg\"").unwrap();
        let raw = out.find("\"rawData\"").unwrap();
        assert!(msg < raw);
        assert!(!out.contains("cache"));
        assert!(out.contains("\"Renamed\""));
    }

    #[test]
    fn unit_struct_has_no_fields() {
        let out = expand_to_string(parse_quote! {
            struct Empty;
        });
        assert!(out.contains("define_struct"));
        assert!(!out.contains("field"));
    }

    #[test]
    fn raw_identifier_keeps_its_name() {
        let out = expand_to_string(parse_quote! {
            struct Keyword {
                r#type: String,
            }
        });
        assert!(out.contains("\"type\""));
        assert!(!out.contains("r#type"));
    }

    #[test]
    fn enums_and_generics_are_rejected() {
        let enumeration: DeriveInput = parse_quote! {
            enum Choice { A, B }
        };
        assert!(expand(&enumeration).is_err());

        let generic: DeriveInput = parse_quote! {
            struct Wrapper<T> { inner: T }
        };
        assert!(expand(&generic).is_err());

        let tuple: DeriveInput = parse_quote! {
            struct Pair(u8, u8);
        };
        assert!(expand(&tuple).is_err());
    }
}
