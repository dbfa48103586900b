//! The typed handler adapter
//!
//! [`wrap`] turns `async fn(Context, Req) -> Result<Resp, BoxError>` into an
//! axum handler. Each call runs decode, invoke and encode in order; the first
//! failure is handed to the configured [`ErrorWriter`](crate::ErrorWriter)
//! and ends the call.
//!
//! | Phase | Skipped when | Failure status if uncoded |
//! |---|---|---|
//! | decode | `Req` is [`NoBody`] | 400 |
//! | invoke | never | 500 |
//! | encode | `Resp` is [`NoBody`] | 500 |
//!
//! Request bodies are buffered up to [`Opts::body_limit`] bytes; a larger
//! body fails decoding with 413. Path parameters the router cannot extract
//! fail the call with 400 whatever the request type.

use std::any::{type_name, TypeId};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::RawPathParamsRejection, FromRequestParts, RawPathParams, Request},
    handler::Handler,
    response::{IntoResponse, Response},
};
use http::{header, request::Parts, Extensions, HeaderMap, Method, StatusCode, Uri};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tracing::Instrument;

use crate::codec::{DecodeError, Incoming, PathParams};
use crate::error::{error_status, wrap_error, BoxError};
use crate::opts::Opts;
use crate::payload::{Decodable, Encodable, NoBody};

/// Per-request context handed to typed handlers
///
/// Gives access to the raw request head, the matched path parameters and the
/// options in effect for the call.
#[derive(Debug)]
pub struct Context {
    parts: Parts,
    path_params: PathParams,
    opts: Opts,
}

impl Context {
    /// The raw request head
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Request extensions, including anything added by middleware
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Value of the path parameter `name` from the matched route
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Options used for this call
    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Take back the request head
    pub fn into_parts(self) -> Parts {
        self.parts
    }
}

/// An axum handler built from a typed function, see [`wrap`]
pub struct TypedHandler<F, Req, Resp> {
    f: F,
    _marker: PhantomData<fn(Req) -> Resp>,
}

impl<F: Clone, Req, Resp> Clone for TypedHandler<F, Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

/// Adapt a typed function into an axum handler
///
/// ```rust,no_run
/// use axum::{routing::get, Router};
/// use serde::{Deserialize, Serialize};
/// use typed_handler::{wrap, BoxError, Context, Decodable, Encodable};
///
/// #[derive(Default, Deserialize, Decodable)]
/// struct Hello {
///     #[typed(query = "name")]
///     name: String,
/// }
///
/// #[derive(Serialize, Encodable)]
/// struct Greeting {
///     message: String,
/// }
///
/// async fn hello(_ctx: Context, req: Hello) -> Result<Greeting, BoxError> {
///     Ok(Greeting { message: format!("hello, {}", req.name) })
/// }
///
/// let app: Router = Router::new().route("/hello", get(wrap(hello)));
/// ```
pub fn wrap<F, Fut, Req, Resp>(f: F) -> TypedHandler<F, Req, Resp>
where
    F: Fn(Context, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    Req: Decodable + Default,
    Resp: Encodable,
{
    TypedHandler {
        f,
        _marker: PhantomData,
    }
}

fn is_no_body<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<NoBody>()
}

fn decode_request(
    opts: &Opts,
    parts: &Parts,
    path_params: &PathParams,
    body: Bytes,
    target: &mut dyn Decodable,
) -> Result<(), BoxError> {
    let incoming = Incoming::new(parts, path_params, body);
    opts.encoder.decode(&incoming, target)
}

/// Buffer the request body, refusing more than `limit` bytes with 413
async fn read_body(parts: &Parts, body: Body, limit: usize) -> Result<Bytes, BoxError> {
    let too_large = || wrap_error(StatusCode::PAYLOAD_TOO_LARGE, DecodeError::BodyTooLarge { limit });

    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|length| length > limit) {
        return Err(too_large());
    }

    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<LengthLimitError>() => Err(too_large()),
        Err(err) => Err(DecodeError::Body(err).into()),
    }
}

/// Attach `status` if uncoded and write the error
fn fail(opts: &Opts, phase: &'static str, status: StatusCode, err: impl Into<BoxError>) -> Response {
    let err = wrap_error(status, err);
    tracing::trace!(phase, status = %error_status(&*err, status), "request failed");
    opts.error_writer.write_error(&*err)
}

impl<F, Fut, Req, Resp> TypedHandler<F, Req, Resp>
where
    F: Fn(Context, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    Req: Decodable + Default,
    Resp: Encodable,
{
    async fn serve<S>(self, req: Request, state: &S) -> Response
    where
        S: Send + Sync,
    {
        let (mut parts, body) = req.into_parts();
        let opts = Opts::from_extensions(&parts.extensions);
        let path_params = match RawPathParams::from_request_parts(&mut parts, state).await {
            Ok(raw) => raw.iter().collect(),
            // Called outside a matched route, e.g. as a fallback
            Err(RawPathParamsRejection::MissingPathParams(_)) => PathParams::new(),
            Err(rejection) => {
                return fail(
                    &opts,
                    "decode",
                    StatusCode::BAD_REQUEST,
                    DecodeError::PathParams(rejection.into()),
                )
            }
        };

        let mut request = Req::default();
        if !is_no_body::<Req>() {
            let bytes = match read_body(&parts, body, opts.body_limit).await {
                Ok(bytes) => bytes,
                Err(err) => return fail(&opts, "decode", StatusCode::BAD_REQUEST, err),
            };
            if let Err(err) = decode_request(&opts, &parts, &path_params, bytes, &mut request) {
                return fail(&opts, "decode", StatusCode::BAD_REQUEST, err);
            }
            tracing::trace!("decoded");
        }

        let ctx = Context {
            parts,
            path_params,
            opts: opts.clone(),
        };
        let response = match (self.f)(ctx, request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::trace!(
                    phase = "invoke",
                    status = %error_status(&*err, StatusCode::INTERNAL_SERVER_ERROR),
                    "request failed"
                );
                return opts.error_writer.write_error(&*err);
            }
        };
        tracing::trace!("invoked");

        if is_no_body::<Resp>() {
            return StatusCode::OK.into_response();
        }
        match opts.encoder.encode(&response) {
            Ok(encoded) => {
                tracing::trace!(status = %encoded.status(), "encoded");
                encoded
            }
            Err(err) => fail(&opts, "encode", StatusCode::INTERNAL_SERVER_ERROR, err),
        }
    }
}

impl<F, Fut, Req, Resp, S> Handler<(), S> for TypedHandler<F, Req, Resp>
where
    F: Fn(Context, Req) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, BoxError>> + Send + 'static,
    Req: Decodable + Default,
    Resp: Encodable,
    S: Send + Sync + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request<Body>, state: S) -> Self::Future {
        let span = tracing::debug_span!(
            "typed_handler",
            request = type_name::<Req>(),
            response = type_name::<Resp>(),
            method = %req.method(),
            path = %req.uri().path(),
        );
        Box::pin(async move { self.serve(req, &state).await }.instrument(span))
    }
}
