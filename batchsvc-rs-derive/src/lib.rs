#![warn(missing_docs)]
#![crate_name = "batchsvc_rs_derive"]
//! # batchsvc-rs-derive
//!
//! This is a set of macros to derive the traits from batchsvc-rs.

extern crate proc_macro;

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

const PARENT_PLACEHOLDER: &str = "{parent}";

#[derive(FromDeriveInput)]
#[darling(attributes(batch), supports(struct_named))]
struct ListResourceAttributes {
    ident: syn::Ident,
    generics: syn::Generics,
    path: String,
    #[darling(default)]
    list: Option<String>,
    #[darling(default)]
    next_link: Option<String>,
}

/// Generates a list envelope and a `ListResource` implementation for an item type.
///
/// `path` is relative to the base URL of the client and may contain `{parent}` once. `list`
/// and `next_link` name the envelope fields and default to `value` and `odata.nextLink`.
///
/// ## Example
/// ```ignore
/// use batchsvc_rs::ListResource;
///
/// #[derive(ListResource, serde::Deserialize, Debug)]
/// #[batch(path = "jobs/{parent}/tasks", list = "value")]
/// pub struct TaskSummary {
///     pub id: String,
/// }
/// ```
#[proc_macro_derive(ListResource, attributes(batch))]
pub fn list_resource_derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let ListResourceAttributes {
        ident: name,
        generics,
        path,
        list,
        next_link,
    } = match ListResourceAttributes::from_derive_input(&ast) {
        Ok(attributes) => attributes,
        Err(err) => return err.write_errors().into(),
    };

    if !generics.params.is_empty() {
        return syn::Error::new_spanned(&generics, "ListResource cannot be derived for generic structs")
            .to_compile_error()
            .into();
    }
    if path.trim_matches('/').is_empty() || path.matches(PARENT_PLACEHOLDER).count() > 1 {
        return syn::Error::new_spanned(
            &name,
            "`path` must be a non-empty relative path with at most one `{parent}`",
        )
        .to_compile_error()
        .into();
    }

    let list_name = list.unwrap_or_else(|| "value".to_string());
    let next_link_name = next_link.unwrap_or_else(|| "odata.nextLink".to_string());
    let response_ident = syn::Ident::new(&format!("{}ListResponse", name), name.span());

    let gen = quote! {
        /// List envelope of a paged response.
        #[derive(serde::Deserialize, Debug, Clone)]
        pub struct #response_ident {
            /// The list of items.
            #[serde(rename = #list_name)]
            pub list: Option<Vec<#name>>,
            /// The continuation token.
            #[serde(rename = #next_link_name)]
            pub next_link: Option<batchsvc_rs::NextLink>,
        }

        impl batchsvc_rs::PagedResponse<#name> for #response_ident {
            fn into_page(self) -> batchsvc_rs::Page<#name> {
                batchsvc_rs::Page::new(self.list.unwrap_or_default(), self.next_link)
            }
        }

        impl batchsvc_rs::resources::ListResource for #name {
            const PATH: &'static str = #path;

            type Response = #response_ident;
        }
    };

    gen.into()
}
