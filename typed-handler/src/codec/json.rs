//! JSON body codec

use axum::{body::Body, response::Response};
use http::{header, HeaderValue};

use super::{Decoder, Encoder, Incoming};
use crate::error::BoxError;
use crate::payload::{Decodable, Encodable};

/// Decodes request bodies as JSON and encodes responses as JSON
///
/// Errors are returned uncoded; the handler adapter picks the status.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Decoder for JsonEncoder {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        target.decode_json(req.body())?;
        Ok(())
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, value: &dyn Encodable) -> Result<Response, BoxError> {
        let mut body = value.encode_json()?;
        body.push(b'\n');

        let mut response = Response::new(Body::from(body));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(response)
    }
}
