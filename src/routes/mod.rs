use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;
use crate::state::AppState;

pub mod form_routes;
pub mod templates;
pub mod vehicle_routes;

/// Full application: browser form, JSON API and health check
pub fn create_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(form_routes::create_form_router())
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_middleware(cors_origins)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backend": state.repository.backend().as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
