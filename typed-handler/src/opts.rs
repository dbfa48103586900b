//! Per-router handler options
//!
//! [`Opts`] pairs the codec with the error writer and bounds how much of a
//! request body a handler buffers. It travels in the request
//! extensions; requests without one use [`Opts::default`].
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use typed_handler::{opts_layer, wrap, Context, NoBody, Opts, TextErrorWriter};
//!
//! async fn ping(_ctx: Context, _req: NoBody) -> Result<NoBody, typed_handler::BoxError> {
//!     Ok(NoBody)
//! }
//!
//! let opts = Opts::default().with_error_writer(TextErrorWriter);
//! let app: Router = Router::new()
//!     .route("/ping", get(wrap(ping)))
//!     .layer(opts_layer(opts));
//! ```

use std::fmt;
use std::sync::Arc;

use axum::Extension;
use http::Extensions;
use once_cell::sync::Lazy;

use crate::codec::{default_codec, Encoder};
use crate::config::{Config, ErrorFormat, DEFAULT_BODY_LIMIT_BYTES};
use crate::error_writer::{ErrorWriter, JsonErrorWriter, TextErrorWriter};

static DEFAULT_OPTS: Lazy<Opts> = Lazy::new(|| Opts {
    encoder: Arc::new(default_codec()),
    error_writer: Arc::new(JsonErrorWriter::default()),
    body_limit: DEFAULT_BODY_LIMIT_BYTES,
});

/// Codec, error writer and body limit used by wrapped handlers
#[derive(Clone)]
pub struct Opts {
    pub encoder: Arc<dyn Encoder>,
    pub error_writer: Arc<dyn ErrorWriter>,
    /// Largest request body, in bytes, buffered for decoding
    pub body_limit: usize,
}

impl Opts {
    pub fn new(encoder: impl Encoder + 'static, error_writer: impl ErrorWriter + 'static) -> Self {
        Self {
            encoder: Arc::new(encoder),
            error_writer: Arc::new(error_writer),
            body_limit: DEFAULT_BODY_LIMIT_BYTES,
        }
    }

    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    pub fn with_error_writer(mut self, error_writer: impl ErrorWriter + 'static) -> Self {
        self.error_writer = Arc::new(error_writer);
        self
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Options built from configuration: default codec, configured error
    /// format and body limit
    pub fn from_config(config: &Config) -> Self {
        let opts = Self::default().with_body_limit(config.body_limit_bytes);
        match config.errors.format {
            ErrorFormat::Json => {
                opts.with_error_writer(JsonErrorWriter::new(config.errors.field.clone()))
            }
            ErrorFormat::Text => opts.with_error_writer(TextErrorWriter),
        }
    }

    /// Options stored in `extensions`, or the defaults
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<Opts>().cloned().unwrap_or_default()
    }
}

impl Default for Opts {
    fn default() -> Self {
        DEFAULT_OPTS.clone()
    }
}

impl fmt::Debug for Opts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opts")
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

/// Layer injecting `opts` into every request
pub fn opts_layer(opts: Opts) -> Extension<Opts> {
    Extension(opts)
}

/// Store `opts` in a request's extensions
pub fn with_opts(extensions: &mut Extensions, opts: Opts) {
    extensions.insert(opts);
}
