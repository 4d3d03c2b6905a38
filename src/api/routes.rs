//! Router configuration for the API.
//!
//! This module provides centralized route registration, the OpenAPI document
//! and middleware configuration for the application.

use axum::{Router, http::Method, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. CORS
/// 2. Compression
/// 3. Request ID - generates/propagates request IDs
/// 4. Logging - logs requests with request IDs
///
/// # Routes
/// - `/api/...` - Back-office endpoints, each answering with a result envelope
/// - `/swagger-ui` - Interactive API documentation
/// - `/openapi.json` - OpenAPI document
pub fn create_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", api))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(cors_layer())
        .with_state(state)
}

fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(handlers::health::health_routes())
        .nest("/members", handlers::members::member_routes())
        .nest("/stats", handlers::stats::stats_routes())
        .nest("/ledger", handlers::ledger::ledger_routes())
        .nest("/products", handlers::products::product_routes())
        .nest("/inventory", handlers::inventory::inventory_routes())
        .nest("/profile", handlers::profile::profile_routes())
}

/// The back office is a browser app served from another origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}
