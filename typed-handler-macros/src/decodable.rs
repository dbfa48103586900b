use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, Data, DeriveInput, Fields};

use crate::attrs::{container_attrs, field_attrs, Source};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let container = container_attrs(&input.attrs)?;

    // Only structs with named fields get a field table; anything else decodes
    // from JSON only.
    let table = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Some(fields.named.iter().collect::<Vec<_>>()),
            Fields::Unit => Some(Vec::new()),
            Fields::Unnamed(_) => None,
        },
        _ => None,
    };

    let field_methods = match table {
        Some(fields) => {
            let mut descriptors = Vec::new();
            let mut setters = Vec::new();

            for field in fields {
                let attrs = field_attrs(&field.attrs)?;
                if attrs.skip {
                    continue;
                }
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                let field_name = ident.unraw().to_string();
                let source = match attrs.source(&field_name, container.rename_all) {
                    Source::Form(key) => quote!(::typed_handler::FieldSource::Form(#key)),
                    Source::Url(key) => quote!(::typed_handler::FieldSource::Url(#key)),
                    Source::Json(key) => quote!(::typed_handler::FieldSource::Json(#key)),
                    Source::Untagged => quote!(::typed_handler::FieldSource::Untagged),
                };
                let index = descriptors.len();

                descriptors.push(quote! {
                    ::typed_handler::Field::new(#field_name, #source)
                });
                setters.push(quote! {
                    #index => ::typed_handler::FieldValue::assign(&mut self.#ident, raw),
                });
            }

            quote! {
                fn fields(&self) -> ::core::option::Option<&'static [::typed_handler::Field]> {
                    const FIELDS: &[::typed_handler::Field] = &[#(#descriptors),*];
                    ::core::option::Option::Some(FIELDS)
                }

                #[allow(unused_variables)]
                fn set_field(
                    &mut self,
                    index: usize,
                    raw: &str,
                ) -> ::core::result::Result<(), ::typed_handler::FieldError> {
                    match index {
                        #(#setters)*
                        _ => ::core::result::Result::Err(::typed_handler::FieldError::NoSuchField(index)),
                    }
                }
            }
        }
        None => TokenStream::new(),
    };

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
        impl #impl_generics ::typed_handler::Decodable for #name #ty_generics #where_clause {
            #field_methods

            fn decode_json(
                &mut self,
                body: &[u8],
            ) -> ::typed_handler::__private::serde_json::Result<()> {
                *self = ::typed_handler::__private::serde_json::from_slice(body)?;
                ::core::result::Result::Ok(())
            }

            #validator
        }
    })
}
