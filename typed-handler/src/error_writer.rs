//! Serializing errors onto the HTTP response
//!
//! The status line always comes from [`error_status`] with a 500 default;
//! writers only decide the content type and body.

use std::error::Error as StdError;
use std::fmt;

use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{header, HeaderValue, StatusCode};
use serde_json::{Map, Value};

use crate::error::error_status;

/// Writes an error as an HTTP response
pub trait ErrorWriter: Send + Sync {
    /// Build the response for `err`
    fn write_error(&self, err: &(dyn StdError + 'static)) -> Response;
}

fn status_of(err: &(dyn StdError + 'static)) -> StatusCode {
    error_status(err, StatusCode::INTERNAL_SERVER_ERROR)
}

/// Plain text error writer
///
/// Body is the error's display text followed by a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextErrorWriter;

impl ErrorWriter for TextErrorWriter {
    fn write_error(&self, err: &(dyn StdError + 'static)) -> Response {
        (
            status_of(err),
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )],
            format!("{err}\n"),
        )
            .into_response()
    }
}

/// JSON error writer
///
/// Body is `{"<field>": "<err>"}` followed by a newline.
#[derive(Debug, Clone)]
pub struct JsonErrorWriter {
    field: String,
}

impl JsonErrorWriter {
    /// Writer using `field` as the JSON key
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// The JSON key the message is written under
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Default for JsonErrorWriter {
    fn default() -> Self {
        Self::new("error")
    }
}

impl ErrorWriter for JsonErrorWriter {
    fn write_error(&self, err: &(dyn StdError + 'static)) -> Response {
        let mut object = Map::new();
        object.insert(self.field.clone(), Value::String(err.to_string()));
        let mut body = Value::Object(object).to_string();
        body.push('\n');

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status_of(err);
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Adapts a closure into an [`ErrorWriter`]
#[derive(Clone)]
pub struct ErrorWriterFn<F>(pub F);

impl<F> ErrorWriter for ErrorWriterFn<F>
where
    F: Fn(&(dyn StdError + 'static)) -> Response + Send + Sync,
{
    fn write_error(&self, err: &(dyn StdError + 'static)) -> Response {
        (self.0)(err)
    }
}

impl<F> fmt::Debug for ErrorWriterFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorWriterFn").finish_non_exhaustive()
    }
}
