pub mod error;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Meeting routes
    let meeting_routes = Router::new()
        .route("/", post(routes::meeting::create))
        .route("/token", post(routes::meeting::token))
        .route("/{meeting_id}", get(routes::meeting::get))
        .route(
            "/{meeting_id}/start-recording",
            post(routes::meeting::start_recording),
        )
        .route(
            "/{meeting_id}/stop-recording",
            post(routes::meeting::stop_recording),
        );

    // Recording agent callbacks
    let recording_routes = Router::new().route("/jibri-events", post(routes::recording::jibri_events));

    // Compose API
    let api = Router::new()
        .nest("/meetings", meeting_routes)
        .nest("/recordings", recording_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
