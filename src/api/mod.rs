//! HTTP layer for mock-pay.
//!
//! Thin glue over the session store: validates input, maps store errors to
//! status codes and renders JSON or HTML.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/session` - Create a payment session (`{"amount": 50000}`)
//! - `GET /api/status/{id}` - Poll session status
//! - `POST /api/confirm/{id}` - Confirm payment (HTML)
//! - `POST /api/cancel/{id}` - Cancel payment (HTML)
//! - `GET /pay/{id}` - Payment page for the payer
//!
//! ## Example
//!
//! ```no_run
//! use mock_pay::api::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> mock_pay::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve(config).await
//! }
//! ```

pub mod handlers;
pub mod pages;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{CreateSessionRequest, CreateSessionResponse, ErrorResponse, SessionStatusResponse};
