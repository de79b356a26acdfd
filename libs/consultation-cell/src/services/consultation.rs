use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use media_cell::services::StorageService;
use onboarding_cell::models::Profile;
use onboarding_cell::services::{ConsentService, OnboardingService};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::UserRole;

use crate::intake;
use crate::models::{
    Consultation, ConsultationAction, ConsultationDetail, ConsultationError, ConsultationStatus,
    CreateConsultationRequest, IntakeResponse, Prescription, PrescriptionRequest,
    MAX_VIDEO_DURATION_SECONDS,
};
use crate::services::lifecycle::ConsultationLifecycleService;
use crate::services::realtime::{dashboard_subscription, RealtimeSubscription};

pub struct ConsultationService {
    supabase: SupabaseClient,
    onboarding: OnboardingService,
    consent: ConsentService,
    storage: StorageService,
    lifecycle: ConsultationLifecycleService,
}

fn db_err(e: anyhow::Error) -> ConsultationError {
    ConsultationError::Database(e.to_string())
}

impl ConsultationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            onboarding: OnboardingService::new(config),
            consent: ConsentService::new(config),
            storage: StorageService::new(config),
            lifecycle: ConsultationLifecycleService::new(),
        }
    }

    /// The actor's profile row is the single source of truth for role
    /// and ownership checks; the token only proves identity.
    async fn actor_profile(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Profile, ConsultationError> {
        self.onboarding
            .get_profile(user_id, auth_token)
            .await
            .map_err(db_err)?
            .ok_or(ConsultationError::ProfileRequired)
    }

    /// Create a consultation with its intake rows in one atomic call.
    pub async fn create_consultation(
        &self,
        user_id: &str,
        request: &CreateConsultationRequest,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        let profile = self.actor_profile(user_id, auth_token).await?;
        if profile.role != UserRole::Patient {
            return Err(ConsultationError::NotPatient);
        }

        let chief_complaint =
            intake::chief_complaint(&request.answers).ok_or(ConsultationError::MissingChiefComplaint)?;

        if let Some(duration) = request.video_duration_seconds {
            if duration < 0 {
                return Err(ConsultationError::InvalidVideoDuration);
            }
            if duration > MAX_VIDEO_DURATION_SECONDS {
                return Err(ConsultationError::VideoTooLong);
            }
        }

        let consented = self
            .consent
            .has_valid_consent(user_id, auth_token)
            .await
            .map_err(db_err)?;
        if !consented {
            return Err(ConsultationError::ConsentRequired);
        }

        let rows = intake::build_intake_rows(&request.answers);
        debug!(
            "Creating consultation for patient {} with {} intake rows",
            user_id,
            rows.len()
        );

        let consultation: Consultation = self
            .supabase
            .rpc(
                "create_consultation_with_intake",
                auth_token,
                json!({
                    "p_chief_complaint": chief_complaint,
                    "p_video_url": request.video_url,
                    "p_video_duration_seconds": request.video_duration_seconds,
                    "p_intake": rows,
                }),
            )
            .await
            .map_err(db_err)?;

        Ok(consultation)
    }

    /// List consultations scoped to the caller: patients see their own,
    /// doctors see the pending queue plus their assignments.
    pub async fn list_consultations(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let profile = self.actor_profile(user_id, auth_token).await?;

        let path = match profile.role {
            UserRole::Patient => format!(
                "/rest/v1/consultations?patient_id=eq.{}&order=created_at.desc",
                user_id
            ),
            UserRole::Doctor => format!(
                "/rest/v1/consultations?or=(status.eq.pending,doctor_id.eq.{})&order=created_at.desc",
                user_id
            ),
        };

        let result: Vec<Consultation> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_err)?;

        Ok(result)
    }

    pub async fn get_consultation(
        &self,
        id: Uuid,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        let path = format!("/rest/v1/consultations?id=eq.{}", id);
        let result: Vec<Consultation> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_err)?;

        result.into_iter().next().ok_or(ConsultationError::NotFound)
    }

    /// Full detail with children and a signed playback URL. Access:
    /// owning patient always; a doctor only while the case is pending
    /// (queue preview) or once assigned to them.
    pub async fn get_consultation_detail(
        &self,
        id: Uuid,
        user_id: &str,
        auth_token: &str,
    ) -> Result<ConsultationDetail, ConsultationError> {
        let consultation = self.get_consultation(id, auth_token).await?;
        let profile = self.actor_profile(user_id, auth_token).await?;

        match profile.role {
            UserRole::Patient => {
                if consultation.patient_id != user_id {
                    return Err(ConsultationError::NotOwner);
                }
            }
            UserRole::Doctor => {
                if consultation.status != ConsultationStatus::Pending
                    && consultation.doctor_id.as_deref() != Some(user_id)
                {
                    return Err(ConsultationError::NotAssigned);
                }
            }
        }

        let intake_path = format!(
            "/rest/v1/intake_responses?consultation_id=eq.{}&order=sort_order.asc",
            id
        );
        let intake_responses: Vec<IntakeResponse> = self
            .supabase
            .request(Method::GET, &intake_path, Some(auth_token), None)
            .await
            .map_err(db_err)?;

        let prescriptions_path = format!(
            "/rest/v1/prescriptions?consultation_id=eq.{}&order=created_at.asc",
            id
        );
        let prescriptions: Vec<Prescription> = self
            .supabase
            .request(Method::GET, &prescriptions_path, Some(auth_token), None)
            .await
            .map_err(db_err)?;

        let patient = self
            .onboarding
            .get_profile(&consultation.patient_id, auth_token)
            .await
            .map_err(db_err)?;

        // Playback URL is best-effort; detail still loads without it.
        let video_signed_url = match &consultation.video_url {
            Some(path) => match self.storage.signed_playback_url(path, auth_token).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Failed to sign video URL for consultation {}: {}", id, e);
                    None
                }
            },
            None => None,
        };

        Ok(ConsultationDetail {
            consultation,
            intake_responses,
            prescriptions,
            patient,
            video_signed_url,
        })
    }

    /// Apply a lifecycle action on behalf of the caller.
    pub async fn apply_action(
        &self,
        id: Uuid,
        user_id: &str,
        action: &ConsultationAction,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        let consultation = self.get_consultation(id, auth_token).await?;
        let profile = self.actor_profile(user_id, auth_token).await?;

        self.lifecycle
            .authorize_action(&consultation, action, user_id, profile.role)?;

        match action {
            ConsultationAction::Accept => self.accept(id, user_id, auth_token).await,
            ConsultationAction::StartReview => {
                self.update_status(id, ConsultationStatus::InReview, json!({}), auth_token)
                    .await?;
                Ok(())
            }
            ConsultationAction::Prescribe { prescription, note } => {
                self.prescribe(id, user_id, prescription.as_ref(), note.as_deref(), auth_token)
                    .await
            }
            ConsultationAction::FollowUp { note } => {
                if let Some(text) = note.as_deref() {
                    self.insert_note(id, user_id, text, auth_token).await?;
                }
                self.update_status(id, ConsultationStatus::FollowUp, json!({}), auth_token)
                    .await?;
                Ok(())
            }
            ConsultationAction::Complete => {
                self.update_status(
                    id,
                    ConsultationStatus::Completed,
                    json!({ "completed_at": Utc::now().to_rfc3339() }),
                    auth_token,
                )
                .await?;
                Ok(())
            }
            ConsultationAction::Cancel => self.cancel(id, auth_token).await,
        }
    }

    /// Claim a pending consultation. The write is conditional on the
    /// row still being pending; first writer wins, everyone else sees
    /// an empty representation and gets a conflict to surface.
    async fn accept(
        &self,
        id: Uuid,
        doctor_id: &str,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        let now = Utc::now().to_rfc3339();
        let updated = self
            .conditional_update(
                id,
                ConsultationStatus::Pending,
                json!({
                    "doctor_id": doctor_id,
                    "status": ConsultationStatus::Accepted,
                    "accepted_at": now,
                    "updated_at": now,
                }),
                auth_token,
            )
            .await?;

        if updated.is_empty() {
            debug!("Accept lost the race for consultation {}", id);
            return Err(ConsultationError::AlreadyClaimed);
        }

        Ok(())
    }

    /// Cancel while still pending; conditional for the same reason as
    /// accept (the row may have been claimed between read and write).
    async fn cancel(&self, id: Uuid, auth_token: &str) -> Result<(), ConsultationError> {
        let updated = self
            .conditional_update(
                id,
                ConsultationStatus::Pending,
                json!({
                    "status": ConsultationStatus::Cancelled,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
                auth_token,
            )
            .await?;

        if updated.is_empty() {
            return Err(ConsultationError::NotCancellable);
        }

        Ok(())
    }

    async fn prescribe(
        &self,
        id: Uuid,
        doctor_id: &str,
        prescription: Option<&PrescriptionRequest>,
        note: Option<&str>,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        let prescription = prescription.ok_or(ConsultationError::MissingPrescription)?;
        prescription.validate()?;

        let prescription_data = json!({
            "consultation_id": id,
            "doctor_id": doctor_id,
            "medication_name": prescription.medication_name,
            "dosage": prescription.dosage,
            "frequency": prescription.frequency,
            "duration": prescription.duration,
            "quantity": prescription.quantity,
            "refills": prescription.refills.unwrap_or(0),
            "pharmacy_notes": prescription.pharmacy_notes,
            "notes_to_patient": prescription.notes_to_patient,
        });

        self.insert("/rest/v1/prescriptions", prescription_data, auth_token)
            .await?;

        if let Some(text) = note {
            self.insert_note(id, doctor_id, text, auth_token).await?;
        }

        self.update_status(id, ConsultationStatus::Prescribed, json!({}), auth_token)
            .await?;

        Ok(())
    }

    async fn insert_note(
        &self,
        consultation_id: Uuid,
        doctor_id: &str,
        note_text: &str,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        self.insert(
            "/rest/v1/doctor_notes",
            json!({
                "consultation_id": consultation_id,
                "doctor_id": doctor_id,
                "note_text": note_text,
            }),
            auth_token,
        )
        .await
    }

    async fn insert(
        &self,
        path: &str,
        data: Value,
        auth_token: &str,
    ) -> Result<(), ConsultationError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, path, Some(auth_token), Some(data), Some(headers))
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ConsultationStatus,
        extra_fields: Value,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let mut fields = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339(),
        });
        if let (Some(map), Some(extra)) = (fields.as_object_mut(), extra_fields.as_object()) {
            for (k, v) in extra {
                map.insert(k.clone(), v.clone());
            }
        }

        let path = format!("/rest/v1/consultations?id=eq.{}", id);
        self.patch(&path, fields, auth_token).await
    }

    async fn conditional_update(
        &self,
        id: Uuid,
        expected_status: ConsultationStatus,
        fields: Value,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let path = format!(
            "/rest/v1/consultations?id=eq.{}&status=eq.{}",
            id, expected_status
        );
        self.patch(&path, fields, auth_token).await
    }

    async fn patch(
        &self,
        path: &str,
        fields: Value,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Consultation> = self
            .supabase
            .request_with_headers(Method::PATCH, path, Some(auth_token), Some(fields), Some(headers))
            .await
            .map_err(db_err)?;

        Ok(result)
    }

    /// Realtime descriptor for the caller's dashboard.
    pub async fn dashboard_feed(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<RealtimeSubscription, ConsultationError> {
        let profile = self.actor_profile(user_id, auth_token).await?;
        Ok(dashboard_subscription(profile.role, user_id))
    }
}
