//! Pluggable request decoding and response encoding
//!
//! A [`Decoder`] fills a [`Decodable`] from an [`Incoming`] request; an
//! [`Encoder`] turns an [`Encodable`] into a response and is also a decoder,
//! so one value can serve as the whole strategy for a router.
//!
//! | Type | Role |
//! |---|---|
//! | [`UrlDecoder`] | struct fields from path parameters and form/query values |
//! | [`JsonEncoder`] | JSON bodies in both directions |
//! | [`MethodDecoder`] | picks a decoder by HTTP method, `*` as fallback |
//! | [`ValidatingDecoder`], [`ValidatingEncoder`] | run [`Validate`] hooks |
//! | [`CombinedCodec`] | one encoder plus one decoder |
//! | [`UnencodableEncoder`] | decode only; encoding fails with 500 |

use std::sync::Arc;

use axum::response::Response;

use crate::error::BoxError;
use crate::payload::{Decodable, Encodable};

mod combined;
mod field;
mod incoming;
mod json;
mod method;
mod url;
mod validate;

pub use combined::{default_codec, CombinedCodec, UnencodableEncoder};
pub use field::{Field, FieldError, FieldSource, FieldValue};
pub use incoming::{Incoming, PathParams};
pub use json::JsonEncoder;
pub use method::MethodDecoder;
pub use url::{DecodeError, UrlDecoder};
pub use validate::{Validate, ValidatingDecoder, ValidatingEncoder};

/// Fills a request value from an inbound request
pub trait Decoder: Send + Sync {
    /// Fill `target` from `req`
    ///
    /// Errors are returned uncoded unless the failure has a status of its
    /// own; the handler defaults them to 400.
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError>;
}

/// Writes a response value, and decodes like a [`Decoder`]
pub trait Encoder: Decoder {
    /// Build the response for `value`
    fn encode(&self, value: &dyn Encodable) -> Result<Response, BoxError>;

    /// Whether this encoder already runs validation hooks
    fn validates(&self) -> bool {
        false
    }
}

impl<D: Decoder + ?Sized> Decoder for Arc<D> {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        (**self).decode(req, target)
    }
}

impl<E: Encoder + ?Sized> Encoder for Arc<E> {
    fn encode(&self, value: &dyn Encodable) -> Result<Response, BoxError> {
        (**self).encode(value)
    }

    fn validates(&self) -> bool {
        (**self).validates()
    }
}
