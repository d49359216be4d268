//! Application router configuration with the JSON API and dashboard route definitions.

use axum::{
    Json, Router,
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{
    AppState,
    access::api_token_guard,
    dashboard::get_dashboard_page,
    endpoints,
    error::ErrorMessage,
    import::initialize_database,
    logging::logging_middleware,
    report::{get_bar_chart, get_categories, get_combined, get_statistics},
    transaction::{get_all_transactions, get_transactions},
};

/// Return a router with all the app's routes.
///
/// The JSON API routes require the configured API token, if any, and allow
/// cross-origin GET requests. Every route shares the request body limit and
/// the optional concurrency limit.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(endpoints::INITIALIZE, get(initialize_database))
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .route(endpoints::ALL_TRANSACTIONS, get(get_all_transactions))
        .route(endpoints::STATISTICS, get(get_statistics))
        .route(endpoints::BAR_CHART, get(get_bar_chart))
        .route(endpoints::CATEGORIES, get(get_categories))
        .route(endpoints::COMBINED, get(get_combined))
        .layer(middleware::from_fn_with_state(state.clone(), api_token_guard))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any)
                .allow_headers(Any),
        );

    let router = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .merge(api_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(RequestBodyLimitLayer::new(
            state.access_config.request_body_limit,
        ));

    let router = match state.access_config.max_concurrent_requests {
        Some(max_concurrent_requests) => {
            tracing::info!("Limiting the server to {max_concurrent_requests} concurrent requests");
            router.layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests))
        }
        None => router,
    };

    router.with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

/// Any route that does not exist.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorMessage {
            message: "Not found".to_owned(),
        }),
    )
        .into_response()
}
