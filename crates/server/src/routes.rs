use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;
use service::RecordRepository;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod collections;

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn RecordRepository>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Every collection at once; this is what the portfolio page is built from.
pub async fn snapshot(State(state): State<ServerState>) -> Json<Value> {
    Json(state.store.snapshot().await)
}

/// Build the application router: snapshot, health, and one set of CRUD
/// routes per entry of the collection table.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let mut app = Router::new()
        .route("/", get(snapshot))
        .route("/health", get(health));

    for spec in state.store.collections() {
        app = app.merge(collections::collection_router(spec));
    }

    app.with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
