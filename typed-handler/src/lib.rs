//! # typed-handler
//!
//! Typed request/response handlers for axum. A handler is written as
//! `async fn(Context, Req) -> Result<Resp, BoxError>`; [`wrap`] turns it into
//! an axum handler that decodes the request, calls the function and encodes
//! the result, writing any error with its HTTP status.
//!
//! ## Features
//!
//! - **Struct decoding**: fields from path parameters, query strings and
//!   urlencoded forms, driven by `#[derive(Decodable)]`
//! - **JSON bodies**: in both directions via serde
//! - **Method dispatch**: per-method decoders with a `*` fallback
//! - **Validation**: `Validate` hooks run after decoding and before encoding
//! - **Status-carrying errors**: [`HttpError`], [`wrap_error`], [`override_error`]
//! - **Pluggable error output**: plain text or JSON error bodies
//!
//! ## Example
//!
//! ```rust,no_run
//! use typed_handler::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize, Decodable)]
//! #[typed(validate)]
//! struct EchoRequest {
//!     #[typed(query = "what")]
//!     what: String,
//! }
//!
//! impl Validate for EchoRequest {
//!     fn validate(&self) -> std::result::Result<(), BoxError> {
//!         if !self.what.ends_with('!') {
//!             return Err("enthusiasm required".into());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Debug, Serialize, Encodable)]
//! struct EchoResponse {
//!     what: String,
//! }
//!
//! async fn echo(_ctx: Context, req: EchoRequest) -> std::result::Result<EchoResponse, BoxError> {
//!     Ok(EchoResponse { what: req.what })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let app = Router::new()
//!         .route("/echo", get(wrap(echo)))
//!         .layer(opts_layer(Opts::from_config(&config)));
//!
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
//!         .await
//!         .map_err(|e| Error::Internal(e.to_string()))?;
//!     axum::serve(listener, app)
//!         .await
//!         .map_err(|e| Error::Internal(e.to_string()))?;
//!     Ok(())
//! }
//! ```
//!
//! `GET /echo?what=hi` answers `400 {"error":"400: enthusiasm required"}`,
//! `GET /echo?what=hi!` answers `200 {"what":"hi!"}`.

extern crate self as typed_handler;

pub mod codec;
pub mod config;
pub mod error;
pub mod error_writer;
pub mod handler;
pub mod observability;
pub mod opts;
pub mod payload;

pub use codec::{
    default_codec, CombinedCodec, DecodeError, Decoder, Encoder, Field, FieldError, FieldSource,
    FieldValue, Incoming, JsonEncoder, MethodDecoder, PathParams, UnencodableEncoder, UrlDecoder,
    Validate, ValidatingDecoder, ValidatingEncoder,
};
pub use config::{Config, ErrorConfig, ErrorFormat};
pub use error::{error_status, override_error, wrap_error, BoxError, Error, HttpError, Result};
pub use error_writer::{ErrorWriter, ErrorWriterFn, JsonErrorWriter, TextErrorWriter};
pub use handler::{wrap, Context, TypedHandler};
pub use observability::{init_tracing, shutdown_tracing};
pub use opts::{opts_layer, with_opts, Opts};
pub use payload::{Decodable, Encodable, NoBody};

pub use typed_handler_macros::{Decodable, Encodable};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::codec::{
        default_codec, CombinedCodec, Decoder, Encoder, JsonEncoder, MethodDecoder, UrlDecoder,
        Validate, ValidatingDecoder, ValidatingEncoder,
    };
    pub use crate::config::Config;
    pub use crate::error::{
        error_status, override_error, wrap_error, BoxError, Error, HttpError, Result,
    };
    pub use crate::error_writer::{ErrorWriter, JsonErrorWriter, TextErrorWriter};
    pub use crate::handler::{wrap, Context};
    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::opts::{opts_layer, Opts};
    pub use crate::payload::{Decodable, Encodable, NoBody};
    pub use typed_handler_macros::{Decodable, Encodable};

    pub use axum::{
        routing::{delete, get, patch, post, put},
        Router,
    };
    pub use http::StatusCode;
    pub use serde::{Deserialize, Serialize};
}
