//! Encoder/decoder pairing and the default codec

use std::fmt;
use std::sync::Arc;

use axum::response::Response;
use http::{Method, StatusCode};

use super::{
    Decoder, Encoder, Incoming, JsonEncoder, MethodDecoder, UrlDecoder, ValidatingDecoder,
    ValidatingEncoder,
};
use crate::error::{BoxError, HttpError};
use crate::payload::{Decodable, Encodable};

/// Pairs an outbound [`Encoder`] with an inbound [`Decoder`]
#[derive(Clone)]
pub struct CombinedCodec {
    pub encoder: Arc<dyn Encoder>,
    pub decoder: Arc<dyn Decoder>,
}

impl CombinedCodec {
    pub fn new(encoder: impl Encoder + 'static, decoder: impl Decoder + 'static) -> Self {
        Self {
            encoder: Arc::new(encoder),
            decoder: Arc::new(decoder),
        }
    }
}

impl fmt::Debug for CombinedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedCodec").finish_non_exhaustive()
    }
}

impl Decoder for CombinedCodec {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        self.decoder.decode(req, target)
    }
}

impl Encoder for CombinedCodec {
    fn encode(&self, value: &dyn Encodable) -> Result<Response, BoxError> {
        self.encoder.encode(value)
    }

    fn validates(&self) -> bool {
        self.encoder.validates()
    }
}

/// A codec that only decodes
///
/// Encoding always fails with `500 cannot encode`; pair it with handlers that
/// return [`NoBody`](crate::NoBody).
#[derive(Clone)]
pub struct UnencodableEncoder {
    decoder: Arc<dyn Decoder>,
}

impl UnencodableEncoder {
    pub fn new(decoder: impl Decoder + 'static) -> Self {
        Self {
            decoder: Arc::new(decoder),
        }
    }
}

impl fmt::Debug for UnencodableEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnencodableEncoder").finish_non_exhaustive()
    }
}

impl Decoder for UnencodableEncoder {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        self.decoder.decode(req, target)
    }
}

impl Encoder for UnencodableEncoder {
    fn encode(&self, _value: &dyn Encodable) -> Result<Response, BoxError> {
        Err(Box::new(HttpError::internal("cannot encode")))
    }
}

/// The codec used when no options are configured
///
/// `GET` requests decode from path parameters and the query string, other
/// methods from a JSON body. Responses are JSON. Validation hooks run after
/// decoding and before encoding.
pub fn default_codec() -> CombinedCodec {
    CombinedCodec {
        encoder: ValidatingEncoder::with_validator(JsonEncoder),
        decoder: Arc::new(ValidatingDecoder::with_validator(
            MethodDecoder::new()
                .on(Method::GET, UrlDecoder)
                .any(JsonEncoder),
        )),
    }
}
