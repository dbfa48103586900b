use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::attrs::container_attrs;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let container = container_attrs(&input.attrs)?;

    let validator = if container.validate {
        quote! {
            fn validator(&self) -> ::core::option::Option<&dyn ::typed_handler::Validate> {
                ::core::option::Option::Some(self)
            }
        }
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        impl #impl_generics ::typed_handler::Encodable for #name #ty_generics #where_clause {
            fn encode_json(
                &self,
            ) -> ::typed_handler::__private::serde_json::Result<::std::vec::Vec<u8>> {
                ::typed_handler::__private::serde_json::to_vec(self)
            }

            #validator
        }
    })
}
