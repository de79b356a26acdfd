use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use consultation_cell::router::consultation_routes;
use media_cell::router::upload_routes;
use onboarding_cell::router::onboarding_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Visita Health API is running!" }))
        .nest("/role-assignment", onboarding_routes(state.clone()))
        .nest("/consultations", consultation_routes(state.clone()))
        .nest("/upload", upload_routes(state.clone()))
}
