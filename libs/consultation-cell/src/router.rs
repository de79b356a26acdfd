use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn consultation_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_consultation).get(list_consultations))
        .route("/realtime", get(realtime_subscription))
        .route(
            "/{id}",
            get(get_consultation).patch(update_consultation),
        )
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
