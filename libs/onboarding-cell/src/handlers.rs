use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::guard::{evaluate_portal_access, AccessDecision, Portal};

use crate::models::{ClientMeta, OnboardingError, RoleAssignmentRequest};
use crate::services::OnboardingService;

fn client_meta(headers: &HeaderMap) -> ClientMeta {
    let ip_address = headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    ClientMeta {
        ip_address,
        user_agent,
    }
}

#[axum::debug_handler]
pub async fn assign_role(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<RoleAssignmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Role assignment requested by user: {}", user.id);

    let role = request.validate()?;
    let meta = client_meta(&headers);

    let service = OnboardingService::new(&config);

    let profile = service
        .complete_onboarding(&request, role, &meta, auth.token())
        .await
        .map_err(|e| AppError::from(OnboardingError::Database(e.to_string())))?;

    Ok(Json(json!({
        "success": true,
        "profile": profile
    })))
}

/// Portal entry check for the frontend shell. The caller names the
/// portal it is about to render; the answer is either allowed or the
/// path the user belongs at instead.
#[axum::debug_handler]
pub async fn portal_access(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(portal): Path<String>,
) -> Result<Json<Value>, AppError> {
    let portal = match portal.as_str() {
        "patient" => Portal::Patient,
        "doctor" => Portal::Doctor,
        other => {
            return Err(AppError::BadRequest(format!("Unknown portal: {}", other)));
        }
    };

    let service = OnboardingService::new(&config);
    let role = service
        .get_role(&user.id, auth.token())
        .await
        .map_err(|e| AppError::from(OnboardingError::Database(e.to_string())))?;

    let response = match evaluate_portal_access(role, portal) {
        AccessDecision::Allowed => json!({ "allowed": true }),
        AccessDecision::RedirectTo(path) => json!({
            "allowed": false,
            "redirect_to": path
        }),
    };

    Ok(Json(response))
}
