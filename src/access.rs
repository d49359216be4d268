//! Access control for the JSON API: an optional bearer token and request limits.

use axum::{
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::{AppState, Error};

/// The default maximum size of a request body in bytes.
pub const DEFAULT_REQUEST_BODY_LIMIT: usize = 64 * 1024;

/// Who may call the API and how much they may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// When set, every API request must carry `Authorization: Bearer <token>`.
    pub api_token: Option<String>,
    /// The maximum size of a request body in bytes.
    pub request_body_limit: usize,
    /// The maximum number of requests handled at once, or no limit if `None`.
    pub max_concurrent_requests: Option<usize>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            request_body_limit: DEFAULT_REQUEST_BODY_LIMIT,
            max_concurrent_requests: None,
        }
    }
}

/// The state needed for the API token middleware.
#[derive(Debug, Clone)]
pub struct TokenState {
    /// The SHA-256 digest of the configured token, if any.
    token_digest: Option<[u8; 32]>,
}

impl FromRef<AppState> for TokenState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_digest: state.access_config.api_token.as_deref().map(digest),
        }
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Middleware that rejects API requests without the configured bearer token.
///
/// Requests pass through untouched when no token is configured. Tokens are
/// compared by their SHA-256 digests.
pub async fn api_token_guard(
    State(state): State<TokenState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.token_digest else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| digest(token.trim()));

    match presented {
        Some(presented) if presented == expected => next.run(request).await,
        Some(_) => {
            tracing::warn!("Rejected request to {} with an invalid API token", request.uri());
            Error::Unauthorized.into_response()
        }
        None => {
            tracing::warn!("Rejected request to {} without an API token", request.uri());
            Error::Unauthorized.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::{StatusCode, header::AUTHORIZATION},
        middleware,
        routing::get,
    };
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppConfig, AppState};

    use super::{AccessConfig, api_token_guard};

    fn get_test_server(api_token: Option<&str>) -> TestServer {
        let config = AppConfig {
            access: AccessConfig {
                api_token: api_token.map(str::to_owned),
                ..Default::default()
            },
            ..Default::default()
        };
        let state = AppState::new(Connection::open_in_memory().unwrap(), config)
            .expect("Could not create app state");
        let app = Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn_with_state(state.clone(), api_token_guard))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn open_when_no_token_configured() {
        let server = get_test_server(None);

        let response = server.get("/api/ping").await;

        response.assert_status_ok();
        response.assert_text("pong");
    }

    #[tokio::test]
    async fn accepts_matching_token() {
        let server = get_test_server(Some("s3cret"));

        let response = server
            .get("/api/ping")
            .add_header(AUTHORIZATION, "Bearer s3cret")
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_token() {
        let server = get_test_server(Some("s3cret"));

        let missing = server.get("/api/ping").await;
        let wrong = server
            .get("/api/ping")
            .add_header(AUTHORIZATION, "Bearer guess")
            .await;
        let not_bearer = server
            .get("/api/ping")
            .add_header(AUTHORIZATION, "Basic s3cret")
            .await;

        for response in [missing, wrong, not_bearer] {
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }
    }
}
