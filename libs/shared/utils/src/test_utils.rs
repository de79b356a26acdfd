use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn profile_response(user_id: &str, role: &str, full_name: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "role": role,
            "full_name": full_name,
            "phone": null,
            "date_of_birth": null,
            "license_number": if role == "doctor" { json!("OK-12345") } else { json!(null) },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn consent_response(patient_id: &str) -> serde_json::Value {
        let expires = Utc::now() + Duration::days(300);
        json!({
            "id": Uuid::new_v4(),
            "patient_id": patient_id,
            "consent_text": "Telemedicine informed consent",
            "consented_at": Utc::now().to_rfc3339(),
            "expires_at": expires.to_rfc3339(),
            "ip_address": "203.0.113.10",
            "user_agent": "test-agent"
        })
    }

    pub fn consultation_response(
        id: &str,
        patient_id: &str,
        doctor_id: Option<&str>,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "status": status,
            "chief_complaint": "cough",
            "video_url": null,
            "video_duration_seconds": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "accepted_at": if doctor_id.is_some() { json!("2024-01-01T01:00:00Z") } else { json!(null) },
            "completed_at": null
        })
    }

    pub fn intake_response(consultation_id: &str, key: &str, answer: &str, sort_order: i32) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "consultation_id": consultation_id,
            "question_key": key,
            "question_text": format!("Question for {}", key),
            "answer": answer,
            "sort_order": sort_order,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn prescription_response(consultation_id: &str, doctor_id: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "consultation_id": consultation_id,
            "doctor_id": doctor_id,
            "medication_name": "Amoxicillin",
            "dosage": "500mg",
            "frequency": "3x daily",
            "duration": "7 days",
            "quantity": 21,
            "refills": 0,
            "pharmacy_notes": null,
            "notes_to_patient": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
