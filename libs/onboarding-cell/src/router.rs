use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn onboarding_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(assign_role))
        .route("/access/{portal}", get(portal_access))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
