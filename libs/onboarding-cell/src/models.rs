use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::UserRole;
use shared_models::error::AppError;

/// One profile per identity; `role` is the authoritative role attribute
/// and never changes after onboarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub role: UserRole,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub license_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only consent grant. Validity is "a record exists with
/// `expires_at` at or after now"; rows are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub consent_text: String,
    pub consented_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignmentRequest {
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub license_number: Option<String>,
}

impl RoleAssignmentRequest {
    /// Field-level validation; returns the parsed role.
    pub fn validate(&self) -> Result<UserRole, OnboardingError> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|_| OnboardingError::InvalidRole(self.role.clone()))?;

        if self.full_name.trim().is_empty() {
            return Err(OnboardingError::MissingFullName);
        }

        if role == UserRole::Doctor
            && self
                .license_number
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        {
            return Err(OnboardingError::MissingLicense);
        }

        Ok(role)
    }
}

/// Request metadata captured into the consent audit trail.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum OnboardingError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Full name is required")]
    MissingFullName,

    #[error("License number required for doctors")]
    MissingLicense,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<OnboardingError> for AppError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::InvalidRole(_)
            | OnboardingError::MissingFullName
            | OnboardingError::MissingLicense => AppError::BadRequest(err.to_string()),
            OnboardingError::ProfileNotFound => AppError::NotFound(err.to_string()),
            OnboardingError::Database(msg) => AppError::Database(msg),
        }
    }
}
