//! REST and page handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    Json,
};

use super::pages;
use super::types::{CreateSessionRequest, CreateSessionResponse, ErrorResponse, SessionStatusResponse};
use crate::error::MockPayError;
use crate::session::{PaymentStatus, SessionId, SessionStore, StoreConfig};

type JsonError = (StatusCode, Json<ErrorResponse>);
type HtmlResponse = (StatusCode, Html<String>);

const DEFAULT_HOST: &str = "localhost:3000";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_store(Arc::new(SessionStore::new()))
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self::with_store(Arc::new(SessionStore::with_config(config)))
    }

    pub fn with_store(store: Arc<SessionStore>) -> Self {
        Self { store }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// Create a new payment session.
///
/// The body is read whatever its content type; anything that is not a JSON
/// object with a valid `amount` gets the same 400 error body.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<CreateSessionResponse>, JsonError> {
    let req = match body {
        Ok(bytes) => CreateSessionRequest::from_body(&bytes),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable session request body");
            CreateSessionRequest::default()
        }
    };

    let amount = req.amount().map_err(|e| {
        tracing::debug!(error = %e, "rejected session request");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::invalid_amount()),
        )
    })?;

    let session = state.store.create(amount).map_err(|e| {
        tracing::error!(error = %e, "failed to create session");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error()),
        )
    })?;

    tracing::info!(session_id = %session.id, amount = %session.amount, "payment session created");
    Ok(Json(CreateSessionResponse::new(
        &session,
        &base_url(&headers),
    )))
}

/// Poll the status of a session.
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, JsonError> {
    let session = session_id
        .parse::<SessionId>()
        .and_then(|id| state.store.get(&id))
        .map_err(|e| match e {
            MockPayError::SessionNotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::session_not_found()),
            ),
            other => {
                tracing::error!(error = %other, "failed to read session");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error()),
                )
            }
        })?;

    Ok(Json(SessionStatusResponse {
        status: session.status,
    }))
}

/// Confirm a pending payment.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HtmlResponse {
    finalize(&state, &session_id, PaymentStatus::Success)
}

/// Cancel a pending payment.
pub async fn cancel_payment(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HtmlResponse {
    finalize(&state, &session_id, PaymentStatus::Cancelled)
}

/// Payment page for the payer.
pub async fn payment_page(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> HtmlResponse {
    let lookup = session_id
        .parse::<SessionId>()
        .and_then(|id| state.store.get(&id));

    match lookup {
        Ok(session) if session.status.is_terminal() => {
            (StatusCode::OK, Html(pages::processed_page(session.status)))
        }
        Ok(session) => (
            StatusCode::OK,
            Html(pages::payment_page(&session.id, session.amount)),
        ),
        Err(MockPayError::SessionNotFound(_)) => {
            (StatusCode::NOT_FOUND, Html(pages::expired_page()))
        }
        Err(e) => internal_error_page(&e),
    }
}

fn finalize(state: &AppState, session_id: &str, target: PaymentStatus) -> HtmlResponse {
    let result = session_id
        .parse::<SessionId>()
        .and_then(|id| state.store.transition(&id, target));

    match result {
        Ok(session) => {
            tracing::info!(session_id = %session.id, status = %session.status, "payment finalized");
            let page = match session.status {
                PaymentStatus::Success => pages::success_page(),
                _ => pages::cancelled_page(),
            };
            (StatusCode::OK, Html(page))
        }
        Err(MockPayError::SessionNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Html(pages::error_page(pages::NOT_FOUND_MESSAGE)),
        ),
        Err(MockPayError::AlreadyFinalized { status, .. }) => {
            tracing::debug!(session_id, %status, "session already finalized");
            (
                StatusCode::BAD_REQUEST,
                Html(pages::error_page(pages::ALREADY_PROCESSED_MESSAGE)),
            )
        }
        Err(e) => internal_error_page(&e),
    }
}

fn internal_error_page(e: &MockPayError) -> HtmlResponse {
    tracing::error!(error = %e, "session store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::error_page("Loi he thong.")),
    )
}

/// Public base URL as seen by the client, for building pay links.
fn base_url(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    // Proxies may send a comma-separated chain; the first hop is the client's.
    let proto = header("x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("http");
    let host = header("host").unwrap_or(DEFAULT_HOST);

    format!("{proto}://{host}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new();
        assert_eq!(state.store.count(), 0);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health().await;
        assert_eq!(response, "OK");
    }

    #[test]
    fn test_base_url_defaults() {
        assert_eq!(base_url(&HeaderMap::new()), "http://localhost:3000");
    }

    #[test]
    fn test_base_url_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("pay.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(base_url(&headers), "https://pay.example.com");
    }

    #[test]
    fn test_finalize_unknown_session() {
        let state = AppState::new();
        let (status, _) = finalize(&state, "nope", PaymentStatus::Success);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_finalize_twice() {
        let state = AppState::new();
        let session = state
            .store
            .create(crate::session::Amount::new(10.0).unwrap())
            .unwrap();
        let id = session.id.to_string();

        let (status, Html(body)) = finalize(&state, &id, PaymentStatus::Cancelled);
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Da huy thanh toan"));

        let (status, Html(body)) = finalize(&state, &id, PaymentStatus::Success);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(pages::ALREADY_PROCESSED_MESSAGE));
    }
}
