//! Buffered view of an inbound request used by decoders

use std::cell::{Cell, OnceCell};

use axum::body::Bytes;
use http::{header, request::Parts, HeaderMap, Method, Uri};

/// Path parameters captured by the router for the matched route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the parameter named exactly `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of the first parameter whose name matches `name` ignoring ASCII case
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parameters in route order as `(name, value)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the route captured nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A request as seen by a [`Decoder`](crate::Decoder)
///
/// Holds the request head, the matched path parameters and the fully buffered
/// body. Form values are parsed on first use.
pub struct Incoming<'a> {
    parts: &'a Parts,
    path_params: &'a PathParams,
    body: Bytes,
    form: OnceCell<Vec<(String, String)>>,
    validated: Cell<bool>,
}

impl<'a> Incoming<'a> {
    /// Wrap a buffered request for decoding
    pub fn new(parts: &'a Parts, path_params: &'a PathParams, body: Bytes) -> Self {
        Self {
            parts,
            path_params,
            body,
            form: OnceCell::new(),
            validated: Cell::new(false),
        }
    }

    /// The request head
    pub fn parts(&self) -> &Parts {
        self.parts
    }

    /// Request method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Request target, including the query string
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Raw request body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parameters captured by the matched route
    pub fn path_params(&self) -> &PathParams {
        self.path_params
    }

    /// First form value stored under exactly `name`
    ///
    /// Urlencoded body values are searched before query values.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First form value whose key matches `name` ignoring ASCII case
    pub fn form_value_ignore_case(&self, name: &str) -> Option<&str> {
        self.form()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn form(&self) -> &[(String, String)] {
        self.form.get_or_init(|| {
            let mut values = Vec::new();
            if self.has_form_body() {
                values.extend(
                    serde_urlencoded::from_bytes::<Vec<(String, String)>>(&self.body)
                        .unwrap_or_default(),
                );
            }
            if let Some(query) = self.parts.uri.query() {
                values.extend(
                    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
                        .unwrap_or_default(),
                );
            }
            values
        })
    }

    fn has_form_body(&self) -> bool {
        let method = &self.parts.method;
        if method != Method::POST && method != Method::PUT && method != Method::PATCH {
            return false;
        }
        self.parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|mime| {
                mime.trim()
                    .eq_ignore_ascii_case("application/x-www-form-urlencoded")
            })
    }

    /// Record that the decoded value was validated
    ///
    /// Returns `true` only the first time within this request.
    pub(crate) fn mark_validated(&self) -> bool {
        !self.validated.replace(true)
    }
}
