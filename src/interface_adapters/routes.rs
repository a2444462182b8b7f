use crate::interface_adapters::handlers::{landing, submit_consent};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn app(state: Arc<AppState>, asset_dir: impl AsRef<Path>) -> Router {
    // The controller redirects to the site path with or without a trailing slash.
    Router::new()
        .route("/guest/s/{site}", get(landing))
        .route("/guest/s/{site}/", get(landing))
        .route("/form", post(submit_consent))
        .nest_service("/assets", ServeDir::new(asset_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
