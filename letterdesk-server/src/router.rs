use axum::{
    extract::{DefaultBodyLimit, State},
    http::{Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::middleware::session_middleware;
use crate::pages;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.inner.config.server.body_limit_bytes;

    // Pages and API carry a session; health checks and static bits do not.
    let session_routes = Router::<AppState>::new()
        .merge(pages::router(state.clone()))
        .nest("/api", api::router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    let public_routes = Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/version", get(version_info))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }));

    session_routes
        .merge(public_routes)
        .fallback(pages::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "llm_available": state.service().llm_available(),
            "store": state.store_backend(),
        })),
    )
}

async fn version_info() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "version": option_env!("GIT_VERSION").unwrap_or("dev"),
            "cargo_version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
