//! Derive macros for `typed-handler`
//!
//! - `#[derive(Decodable)]` builds the field table used by the URL/form
//!   decoder and JSON body decoding through serde.
//! - `#[derive(Encodable)]` encodes through serde.
//!
//! Both read a struct-level `#[typed(validate)]` to expose the type's
//! `Validate` implementation to the validating codecs.

mod attrs;
mod case;
mod decodable;
mod encodable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive `typed_handler::Decodable`
///
/// Requires `serde::Deserialize` and `Default`.
///
/// Field attributes:
///
/// - `#[typed(form = "k")]`, `#[typed(query = "k")]`, `#[typed(schema = "k")]`:
///   read form/query value `k` only
/// - `#[typed(url = "k")]`: read path parameter `k`
/// - `#[typed(skip)]`: leave the field out of URL/form decoding
///
/// A field with none of these but a `#[serde(rename = "k")]` reads path
/// parameter `k`, then form value `k`. The same applies to the name given by
/// a struct-level `#[serde(rename_all = "...")]`. Remaining fields match
/// their own name against path parameters and form keys, ignoring case.
///
/// Every field not skipped must implement `typed_handler::FieldValue`.
///
/// ```ignore
/// #[derive(Default, Deserialize, Decodable)]
/// #[typed(validate)]
/// struct ListOrders {
///     #[typed(url = "customer")]
///     customer_id: u64,
///     #[typed(query = "status")]
///     status: Option<String>,
///     #[serde(rename = "pageSize")]
///     page_size: u32,
///     #[typed(skip)]
///     filters: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Decodable, attributes(typed))]
pub fn derive_decodable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    decodable::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `typed_handler::Encodable`
///
/// Requires `serde::Serialize`.
#[proc_macro_derive(Encodable, attributes(typed))]
pub fn derive_encodable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    encodable::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
