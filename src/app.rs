use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/phones", get(handlers::get_phones).post(handlers::create_phone))
        .route("/api/phones/:id/apps", post(handlers::add_app))
        .route("/api/phones/:id/apps/:index", put(handlers::update_app))
        .route("/api/chart", get(handlers::get_chart))
        .route("/api/compute", post(handlers::compute))
        .route("/assets/*path", get(handlers::get_asset))
        .with_state(state)
}
