//! Decoder selection by HTTP method

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};

use super::{Decoder, Incoming};
use crate::error::{BoxError, HttpError};
use crate::payload::Decodable;

/// Dispatches to a decoder registered for the request method
///
/// Methods without an entry use the `*` fallback; with no fallback the
/// request fails with `405 method not allowed`.
///
/// ```rust
/// use http::Method;
/// use typed_handler::{JsonEncoder, MethodDecoder, UrlDecoder};
///
/// let decoder = MethodDecoder::new()
///     .on(Method::GET, UrlDecoder)
///     .any(JsonEncoder);
/// ```
#[derive(Clone, Default)]
pub struct MethodDecoder {
    by_method: HashMap<Method, Arc<dyn Decoder>>,
    fallback: Option<Arc<dyn Decoder>>,
}

impl MethodDecoder {
    /// An empty table; every method is rejected until registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `decoder` for requests with `method`
    pub fn on(mut self, method: Method, decoder: impl Decoder + 'static) -> Self {
        self.by_method.insert(method, Arc::new(decoder));
        self
    }

    /// Use `decoder` for methods without their own entry
    pub fn any(mut self, decoder: impl Decoder + 'static) -> Self {
        self.fallback = Some(Arc::new(decoder));
        self
    }

    /// Register by method name, `"*"` being the fallback
    ///
    /// Names are matched case-insensitively. Invalid method names are rejected
    /// with an error.
    pub fn insert(
        &mut self,
        method: &str,
        decoder: impl Decoder + 'static,
    ) -> Result<(), http::method::InvalidMethod> {
        if method == "*" {
            self.fallback = Some(Arc::new(decoder));
            return Ok(());
        }
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
        self.by_method.insert(method, Arc::new(decoder));
        Ok(())
    }

    fn select(&self, method: &Method) -> Option<&dyn Decoder> {
        self.by_method
            .get(method)
            .or(self.fallback.as_ref())
            .map(|decoder| &**decoder)
    }
}

impl fmt::Debug for MethodDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.by_method.keys().map(Method::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("MethodDecoder")
            .field("methods", &methods)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Decoder for MethodDecoder {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        match self.select(req.method()) {
            Some(decoder) => decoder.decode(req, target),
            None => Err(Box::new(HttpError::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "method not allowed",
            ))),
        }
    }
}
