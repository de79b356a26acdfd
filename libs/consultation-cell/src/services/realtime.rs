use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::UserRole;

/// Postgres change-feed subscription descriptor handed to the browser.
///
/// Purely a UX refresh hint; delivery is fire-and-forget and nothing
/// correctness-critical listens to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSubscription {
    pub channel: String,
    pub schema: String,
    pub table: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl RealtimeSubscription {
    fn consultations(filter: Option<String>) -> Self {
        let channel = match &filter {
            Some(f) => format!("consultations-{}", f),
            None => "consultations-all".to_string(),
        };
        Self {
            channel,
            schema: "public".to_string(),
            table: "consultations".to_string(),
            event: "*".to_string(),
            filter,
        }
    }
}

/// Dashboard feed: patients watch their own rows, doctors watch the
/// whole table (their queue is pending rows plus assignments).
pub fn dashboard_subscription(role: UserRole, user_id: &str) -> RealtimeSubscription {
    match role {
        UserRole::Patient => {
            RealtimeSubscription::consultations(Some(format!("patient_id=eq.{}", user_id)))
        }
        UserRole::Doctor => RealtimeSubscription::consultations(None),
    }
}

/// Single-consultation feed used by detail views.
pub fn consultation_subscription(consultation_id: Uuid) -> RealtimeSubscription {
    RealtimeSubscription::consultations(Some(format!("id=eq.{}", consultation_id)))
}
