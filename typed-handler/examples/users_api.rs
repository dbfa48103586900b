//! Users API example
//!
//! A small in-memory users service plus the echo endpoint.
//!
//! Run with:
//! ```bash
//! cargo run --example users-api
//! ```
//!
//! Then try:
//! ```bash
//! curl 'http://localhost:8080/echo?what=hi'
//! curl 'http://localhost:8080/echo?what=hi!'
//! curl -X POST http://localhost:8080/users -d '{"name":"ada"}'
//! curl http://localhost:8080/users/1
//! ```
//!
//! Settings come from ./typed-handler.toml and TYPED_HANDLER_* variables,
//! e.g. `TYPED_HANDLER_ERRORS__FORMAT=text`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::Extension;
use tokio::signal;
use tower_http::trace::TraceLayer;
use typed_handler::prelude::*;

#[derive(Debug, Default, Deserialize, Decodable)]
#[typed(validate)]
struct EchoRequest {
    #[typed(query = "what")]
    what: String,
}

impl Validate for EchoRequest {
    fn validate(&self) -> std::result::Result<(), BoxError> {
        if !self.what.ends_with('!') {
            return Err("enthusiasm required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Encodable)]
struct EchoResponse {
    what: String,
}

async fn echo(_ctx: Context, req: EchoRequest) -> std::result::Result<EchoResponse, BoxError> {
    Ok(EchoResponse { what: req.what })
}

#[derive(Debug, Clone, Serialize, Encodable)]
struct User {
    id: u64,
    name: String,
}

#[derive(Debug, Default, Deserialize, Decodable)]
struct GetUser {
    #[typed(url = "id")]
    id: u64,
}

#[derive(Debug, Default, Deserialize, Decodable)]
#[typed(validate)]
struct CreateUser {
    #[serde(default)]
    name: String,
}

impl Validate for CreateUser {
    fn validate(&self) -> std::result::Result<(), BoxError> {
        if self.name.is_empty() {
            return Err("name is required".into());
        }
        Ok(())
    }
}

#[derive(Default)]
struct Users {
    next_id: u64,
    by_id: HashMap<u64, User>,
}

#[derive(Clone, Default)]
struct UserStore(Arc<RwLock<Users>>);

impl UserStore {
    fn from_context(ctx: &Context) -> std::result::Result<Self, BoxError> {
        ctx.extensions()
            .get::<Self>()
            .cloned()
            .ok_or_else(|| HttpError::internal("user store not configured").into())
    }

    fn get(&self, id: u64) -> std::result::Result<Option<User>, BoxError> {
        let users = self
            .0
            .read()
            .map_err(|_| HttpError::internal("user store poisoned"))?;
        Ok(users.by_id.get(&id).cloned())
    }

    fn create(&self, name: String) -> std::result::Result<User, BoxError> {
        let mut users = self
            .0
            .write()
            .map_err(|_| HttpError::internal("user store poisoned"))?;
        users.next_id += 1;
        let user = User {
            id: users.next_id,
            name,
        };
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }
}

async fn get_user(ctx: Context, req: GetUser) -> std::result::Result<User, BoxError> {
    UserStore::from_context(&ctx)?
        .get(req.id)?
        .ok_or_else(|| HttpError::not_found("user not found").into())
}

async fn create_user(ctx: Context, req: CreateUser) -> std::result::Result<User, BoxError> {
    let user = UserStore::from_context(&ctx)?.create(req.name)?;
    tracing::info!(user_id = user.id, "user created");
    Ok(user)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let app = Router::new()
        .route("/echo", get(wrap(echo)))
        .route("/users", post(wrap(create_user)))
        .route("/users/{id}", get(wrap(get_user)))
        .layer(Extension(UserStore::default()))
        .layer(opts_layer(Opts::from_config(&config)))
        .layer(config.body_limit_layer())
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting {} on {}", config.service_name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracing();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
