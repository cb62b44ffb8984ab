//! API router and server configuration.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cancel_payment, confirm_payment, create_session, health, payment_page, session_status,
    AppState,
};
use crate::session::{spawn_sweeper, StoreConfig};

/// Create the router with a fresh default store.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new())
}

/// Create the router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/session", post(create_session))
        .route("/status/{id}", get(session_status))
        .route("/confirm/{id}", post(confirm_payment))
        .route("/cancel/{id}", post(cancel_payment));

    Router::new()
        .route("/health", get(health))
        .route("/pay/{id}", get(payment_page))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Session lifetime settings.
    pub store: StoreConfig,
    /// Stop on Ctrl-C instead of running until killed.
    pub graceful_shutdown: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store: StoreConfig::default(),
            graceful_shutdown: true,
        }
    }
}

/// Start the server with a store built from `config`.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    let state = AppState::with_config(config.store);
    serve_with_state(config, state).await
}

/// Start the server with custom state.
///
/// The background sweeper runs for as long as the server does.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let sweeper = spawn_sweeper(state.store.clone());
    let router = create_router_with_state(state);

    tracing::info!(
        ttl_secs = config.store.ttl.as_secs(),
        sweep_secs = config.store.sweep_interval.as_secs(),
        "Starting mock-pay server on {}",
        addr
    );

    let result = run(&addr, router, config.graceful_shutdown).await;
    sweeper.abort();
    result
}

async fn run(addr: &str, router: Router, graceful_shutdown: bool) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, router);
    if graceful_shutdown {
        server.with_graceful_shutdown(shutdown_signal()).await?;
    } else {
        server.await?;
    }

    tracing::info!("mock-pay server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
