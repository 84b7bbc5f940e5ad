mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::geometry::{GeometryResolver, GeometrySource};

pub use state::AppState;

pub fn build_router<S: GeometrySource>(resolver: GeometryResolver<S>) -> Router {
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route("/api/health", get(handlers::health::<S>))
        .route("/api/geometry", get(handlers::geometry::<S>))
        .route("/api/provinces", get(handlers::provinces))
        .route("/api/provinces/{name}/boundary", get(handlers::province_boundary::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start<S: GeometrySource>(
    host: &str,
    port: u16,
    resolver: GeometryResolver<S>,
) -> std::io::Result<()> {
    let min_interval_ms = resolver.min_interval().as_millis() as u64;
    let app = build_router(resolver);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        min_interval_ms,
        "province geometry server listening on http://{}",
        addr
    );

    axum::serve(listener, app).await
}
