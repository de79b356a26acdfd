use anyhow::Result;
use chrono::{DateTime, Months, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

/// Consent text snapshotted into every consent record, per Oklahoma
/// telemedicine requirements (59 O.S. § 478.1).
pub const TELEMEDICINE_CONSENT_TEXT: &str = "\
OKLAHOMA TELEMEDICINE INFORMED CONSENT

I understand and agree to the following:

1. Telemedicine involves the use of electronic communications to enable healthcare providers at different locations to share individual patient medical information for the purpose of improving patient care.

2. The laws that protect the confidentiality of my medical information also apply to telemedicine. I understand that the information may be used for diagnosis, therapy, follow-up, and/or patient education, and that my information will be handled in accordance with HIPAA regulations.

3. I understand that I have the right to withhold or withdraw consent at any time without affecting my right to future care or treatment.

4. I understand that store-and-forward telemedicine involves the transmission of my medical information, including video recordings and intake questionnaire responses, from an originating site to a distant healthcare provider for evaluation.

5. I understand that the healthcare provider will adhere to the same standard of care as in traditional in-person settings.

6. I understand that this platform does not prescribe controlled substances (Schedule II-V drugs).

7. I understand that in an emergency, I should call 911 or go to the nearest emergency room.

8. I have read and understand the information provided above. I consent to participate in telemedicine services through this platform.

This consent is valid for one (1) year from the date of signing, per Oklahoma law (59 O.S. \u{a7} 478.1).";

pub const CONSENT_VALIDITY_MONTHS: u32 = 12;

/// Compute when a consent granted at `consented_at` lapses.
pub fn consent_expiry(consented_at: DateTime<Utc>) -> DateTime<Utc> {
    consented_at
        .checked_add_months(Months::new(CONSENT_VALIDITY_MONTHS))
        .unwrap_or(consented_at)
}

pub struct ConsentService {
    supabase: SupabaseClient,
}

impl ConsentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// The consent gate: does any unexpired consent record exist for
    /// this patient right now?
    pub async fn has_valid_consent(&self, patient_id: &str, auth_token: &str) -> Result<bool> {
        debug!("Checking consent for patient: {}", patient_id);

        let now = Utc::now().to_rfc3339();
        let path = format!(
            "/rest/v1/consent_records?patient_id=eq.{}&expires_at=gte.{}&select=id&limit=1",
            patient_id,
            urlencoding::encode(&now)
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(!result.is_empty())
    }
}
