//! Validation hooks around decoders and encoders

use std::fmt;
use std::sync::Arc;

use axum::response::Response;

use super::{Decoder, Encoder, Incoming};
use crate::error::BoxError;
use crate::payload::{Decodable, Encodable};

/// A value that can check itself
///
/// Types opt in to being checked by the validating wrappers with
/// `#[typed(validate)]` on their derive.
///
/// ```rust
/// use serde::Deserialize;
/// use typed_handler::{BoxError, Decodable, Validate};
///
/// #[derive(Default, Deserialize, Decodable)]
/// #[typed(validate)]
/// struct Echo {
///     #[typed(query = "what")]
///     what: String,
/// }
///
/// impl Validate for Echo {
///     fn validate(&self) -> Result<(), BoxError> {
///         if !self.what.ends_with('!') {
///             return Err("enthusiasm required".into());
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    fn validate(&self) -> Result<(), BoxError>;
}

/// Runs the decoded value's validation hook after the inner decoder succeeds
///
/// The hook runs at most once per request, however many validating wrappers
/// are stacked. Validation errors are returned uncoded.
#[derive(Clone)]
pub struct ValidatingDecoder {
    inner: Arc<dyn Decoder>,
}

impl ValidatingDecoder {
    pub fn with_validator(inner: impl Decoder + 'static) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl fmt::Debug for ValidatingDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingDecoder").finish_non_exhaustive()
    }
}

fn decode_validated<D: Decoder + ?Sized>(
    inner: &D,
    req: &Incoming<'_>,
    target: &mut dyn Decodable,
) -> Result<(), BoxError> {
    inner.decode(req, target)?;
    if let Some(validator) = target.validator() {
        if req.mark_validated() {
            validator.validate()?;
        }
    }
    Ok(())
}

impl Decoder for ValidatingDecoder {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        decode_validated(&*self.inner, req, target)
    }
}

/// Runs the value's validation hook before encoding and after decoding
#[derive(Clone)]
pub struct ValidatingEncoder {
    inner: Arc<dyn Encoder>,
}

impl ValidatingEncoder {
    /// Wrap `inner` unless it already validates
    pub fn with_validator(inner: impl Encoder + 'static) -> Arc<dyn Encoder> {
        if inner.validates() {
            return Arc::new(inner);
        }
        Arc::new(Self {
            inner: Arc::new(inner),
        })
    }
}

impl fmt::Debug for ValidatingEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingEncoder").finish_non_exhaustive()
    }
}

impl Decoder for ValidatingEncoder {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        decode_validated(&*self.inner, req, target)
    }
}

impl Encoder for ValidatingEncoder {
    fn encode(&self, value: &dyn Encodable) -> Result<Response, BoxError> {
        if let Some(validator) = value.validator() {
            validator.validate()?;
        }
        self.inner.encode(value)
    }

    fn validates(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{JsonEncoder, PathParams, UrlDecoder};
    use crate::{Decodable, Encodable, HttpError};
    use axum::body::Bytes;
    use http::Request;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, Serialize, Deserialize, Decodable, Encodable)]
    #[typed(validate)]
    struct Counted {
        #[typed(query = "what")]
        what: String,
        #[typed(skip)]
        #[serde(skip)]
        calls: Arc<AtomicUsize>,
    }

    impl Validate for Counted {
        fn validate(&self) -> Result<(), BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.what.ends_with('!') {
                return Err("enthusiasm required".into());
            }
            Ok(())
        }
    }

    #[derive(Debug, Default, Deserialize, Decodable)]
    struct Unchecked {
        #[typed(query = "what")]
        what: String,
    }

    fn run(decoder: &dyn Decoder, uri: &str, target: &mut dyn Decodable) -> Result<(), BoxError> {
        let parts = Request::get(uri).body(()).unwrap().into_parts().0;
        let params = PathParams::new();
        let incoming = Incoming::new(&parts, &params, Bytes::new());
        decoder.decode(&incoming, target)
    }

    #[test]
    fn test_decoder_surfaces_validation_error_uncoded() {
        let decoder = ValidatingDecoder::with_validator(UrlDecoder);
        let mut value = Counted::default();

        let err = run(&decoder, "/echo?what=hi", &mut value).unwrap_err();

        assert_eq!(err.to_string(), "enthusiasm required");
        assert!(err.downcast_ref::<HttpError>().is_none());
    }

    #[test]
    fn test_decoder_passes_valid_value() {
        let decoder = ValidatingDecoder::with_validator(UrlDecoder);
        let mut value = Counted::default();

        run(&decoder, "/echo?what=hi!", &mut value).unwrap();

        assert_eq!(value.what, "hi!");
        assert_eq!(value.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stacked_wrappers_validate_once() {
        let decoder = ValidatingDecoder::with_validator(ValidatingDecoder::with_validator(
            ValidatingDecoder::with_validator(UrlDecoder),
        ));
        let mut value = Counted::default();

        run(&decoder, "/echo?what=yes!", &mut value).unwrap();

        assert_eq!(value.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_encoder_decode_side_validates_once() {
        let decoder =
            ValidatingDecoder::with_validator(ValidatingEncoder::with_validator(JsonEncoder));
        let parts = Request::post("/echo").body(()).unwrap().into_parts().0;
        let params = PathParams::new();
        let incoming = Incoming::new(&parts, &params, Bytes::from_static(b"{\"what\":\"yo!\"}"));
        let mut value = Counted::default();

        decoder.decode(&incoming, &mut value).unwrap();

        assert_eq!(value.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_types_without_hook_are_not_checked() {
        let decoder = ValidatingDecoder::with_validator(UrlDecoder);
        let mut value = Unchecked::default();

        run(&decoder, "/echo?what=hi", &mut value).unwrap();

        assert_eq!(value.what, "hi");
    }

    #[test]
    fn test_encoder_validates_before_encoding() {
        let encoder = ValidatingEncoder::with_validator(JsonEncoder);
        let value = Counted {
            what: "meh".into(),
            calls: Arc::default(),
        };

        let err = encoder.encode(&value).unwrap_err();

        assert_eq!(err.to_string(), "enthusiasm required");
        assert_eq!(value.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_encoder_wrap_is_idempotent() {
        let once = ValidatingEncoder::with_validator(JsonEncoder);
        let twice = ValidatingEncoder::with_validator(once.clone());
        let value = Counted {
            what: "ok!".into(),
            calls: Arc::default(),
        };

        twice.encode(&value).unwrap();

        assert!(twice.validates());
        assert_eq!(value.calls.load(Ordering::SeqCst), 1);
    }
}
