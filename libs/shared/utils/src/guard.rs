use shared_models::auth::UserRole;

/// A role-scoped area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Portal {
    Patient,
    Doctor,
}

/// Outcome of evaluating access to a portal. Callers either proceed or
/// send the browser to `RedirectTo`'s path; there is no implicit
/// framework-level redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    RedirectTo(String),
}

/// Gate entry into a role's portal.
///
/// A user with no profile yet has no role and is sent to onboarding; a
/// user with the wrong role is sent to their own portal.
pub fn evaluate_portal_access(role: Option<UserRole>, portal: Portal) -> AccessDecision {
    match (role, portal) {
        (None, _) => AccessDecision::RedirectTo("/onboarding".to_string()),
        (Some(UserRole::Patient), Portal::Patient) => AccessDecision::Allowed,
        (Some(UserRole::Doctor), Portal::Doctor) => AccessDecision::Allowed,
        (Some(UserRole::Patient), Portal::Doctor) => {
            AccessDecision::RedirectTo("/patient".to_string())
        }
        (Some(UserRole::Doctor), Portal::Patient) => {
            AccessDecision::RedirectTo("/doctor".to_string())
        }
    }
}
