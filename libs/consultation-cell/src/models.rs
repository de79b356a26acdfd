use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use onboarding_cell::models::Profile;
use shared_models::error::AppError;

/// Recording cap enforced at submission; the browser auto-stops at the
/// same limit.
pub const MAX_VIDEO_DURATION_SECONDS: i32 = 180;

// ==============================================================================
// CORE CONSULTATION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    Accepted,
    InReview,
    Prescribed,
    FollowUp,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConsultationStatus::Completed | ConsultationStatus::Cancelled)
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsultationStatus::Pending => write!(f, "pending"),
            ConsultationStatus::Accepted => write!(f, "accepted"),
            ConsultationStatus::InReview => write!(f, "in_review"),
            ConsultationStatus::Prescribed => write!(f, "prescribed"),
            ConsultationStatus::FollowUp => write!(f, "follow_up"),
            ConsultationStatus::Completed => write!(f, "completed"),
            ConsultationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub status: ConsultationStatus,
    pub chief_complaint: String,
    pub video_url: Option<String>,
    pub video_duration_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub question_key: String,
    pub question_text: String,
    pub answer: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub doctor_id: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: Option<i32>,
    pub refills: i32,
    pub pharmacy_notes: Option<String>,
    pub notes_to_patient: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorNote {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub doctor_id: String,
    pub note_text: String,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConsultationRequest {
    pub answers: HashMap<String, String>,
    pub video_url: Option<String>,
    pub video_duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionRequest {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub quantity: Option<i32>,
    pub refills: Option<i32>,
    pub pharmacy_notes: Option<String>,
    pub notes_to_patient: Option<String>,
}

impl PrescriptionRequest {
    pub fn validate(&self) -> Result<(), ConsultationError> {
        for (field, value) in [
            ("medication_name", &self.medication_name),
            ("dosage", &self.dosage),
            ("frequency", &self.frequency),
            ("duration", &self.duration),
        ] {
            if value.trim().is_empty() {
                return Err(ConsultationError::InvalidPrescription(field.to_string()));
            }
        }
        Ok(())
    }
}

/// Lifecycle action carried in the PATCH body, dispatched on the
/// `action` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConsultationAction {
    Accept,
    StartReview,
    Prescribe {
        #[serde(default)]
        prescription: Option<PrescriptionRequest>,
        #[serde(default)]
        note: Option<String>,
    },
    FollowUp {
        #[serde(default)]
        note: Option<String>,
    },
    Complete,
    Cancel,
}

impl ConsultationAction {
    pub fn name(&self) -> &'static str {
        match self {
            ConsultationAction::Accept => "accept",
            ConsultationAction::StartReview => "start_review",
            ConsultationAction::Prescribe { .. } => "prescribe",
            ConsultationAction::FollowUp { .. } => "follow_up",
            ConsultationAction::Complete => "complete",
            ConsultationAction::Cancel => "cancel",
        }
    }
}

/// Full detail payload for a single consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationDetail {
    #[serde(flatten)]
    pub consultation: Consultation,
    pub intake_responses: Vec<IntakeResponse>,
    pub prescriptions: Vec<Prescription>,
    pub patient: Option<Profile>,
    pub video_signed_url: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConsultationError {
    #[error("Consultation not found")]
    NotFound,

    #[error("Complete onboarding before using the service")]
    ProfileRequired,

    #[error("Only patients can create consultations")]
    NotPatient,

    #[error("Only doctors can perform this action")]
    NotDoctor,

    #[error("Consultation is assigned to another doctor")]
    NotAssigned,

    #[error("Consultation belongs to another patient")]
    NotOwner,

    #[error("Valid consent required. Please complete onboarding.")]
    ConsentRequired,

    #[error("Chief complaint required")]
    MissingChiefComplaint,

    #[error("Video exceeds the {MAX_VIDEO_DURATION_SECONDS} second limit")]
    VideoTooLong,

    #[error("Video duration must be a positive number of seconds")]
    InvalidVideoDuration,

    #[error("Prescription data required")]
    MissingPrescription,

    #[error("Prescription field required: {0}")]
    InvalidPrescription(String),

    #[error("Consultation already claimed by another doctor")]
    AlreadyClaimed,

    #[error("Can only cancel pending consultations")]
    NotCancellable,

    #[error("Action {action} not allowed from status {from}")]
    InvalidTransition {
        from: ConsultationStatus,
        action: &'static str,
    },

    #[error("Consultation is {0} and can no longer change")]
    Terminal(ConsultationStatus),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound => AppError::NotFound(err.to_string()),
            ConsultationError::ProfileRequired
            | ConsultationError::NotPatient
            | ConsultationError::NotDoctor
            | ConsultationError::NotAssigned
            | ConsultationError::NotOwner => AppError::Forbidden(err.to_string()),
            ConsultationError::ConsentRequired => AppError::PreconditionFailed(err.to_string()),
            ConsultationError::MissingChiefComplaint
            | ConsultationError::VideoTooLong
            | ConsultationError::InvalidVideoDuration
            | ConsultationError::MissingPrescription
            | ConsultationError::InvalidPrescription(_) => AppError::BadRequest(err.to_string()),
            ConsultationError::AlreadyClaimed
            | ConsultationError::NotCancellable
            | ConsultationError::InvalidTransition { .. }
            | ConsultationError::Terminal(_) => AppError::Conflict(err.to_string()),
            ConsultationError::Database(msg) => AppError::Database(msg),
        }
    }
}
