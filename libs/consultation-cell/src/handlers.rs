use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{ConsultationAction, CreateConsultationRequest};
use crate::services::ConsultationService;

#[axum::debug_handler]
pub async fn create_consultation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Creating consultation for user: {}", user.id);

    let service = ConsultationService::new(&config);
    let consultation = service
        .create_consultation(&user.id, &request, auth.token())
        .await?;

    info!(
        "Consultation {} created for patient {}",
        consultation.id, user.id
    );

    Ok(Json(json!({
        "success": true,
        "id": consultation.id,
        "consultation": consultation,
    })))
}

#[axum::debug_handler]
pub async fn list_consultations(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&config);
    let consultations = service.list_consultations(&user.id, auth.token()).await?;

    Ok(Json(json!({ "consultations": consultations })))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&config);
    let detail = service
        .get_consultation_detail(id, &user.id, auth.token())
        .await?;

    Ok(Json(json!(detail)))
}

#[axum::debug_handler]
pub async fn update_consultation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let action: ConsultationAction = serde_json::from_value(body)
        .map_err(|_| AppError::BadRequest("Invalid action".to_string()))?;

    debug!(
        "Action {} on consultation {} by user {}",
        action.name(),
        id,
        user.id
    );

    let service = ConsultationService::new(&config);
    service
        .apply_action(id, &user.id, &action, auth.token())
        .await?;

    info!("Consultation {} updated via {}", id, action.name());

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn realtime_subscription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&config);
    let subscription = service.dashboard_feed(&user.id, auth.token()).await?;

    Ok(Json(json!(subscription)))
}
