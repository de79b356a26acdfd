use anyhow::{anyhow, Result};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::UserRole;

use crate::models::{ClientMeta, Profile, RoleAssignmentRequest};
use crate::services::consent::TELEMEDICINE_CONSENT_TEXT;

pub struct OnboardingService {
    supabase: SupabaseClient,
}

impl OnboardingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create the caller's profile and, for patients, the initial
    /// consent record. Both rows commit in one stored procedure so a
    /// failure cannot leave a profile with no consent behind it.
    pub async fn complete_onboarding(
        &self,
        request: &RoleAssignmentRequest,
        role: UserRole,
        meta: &ClientMeta,
        auth_token: &str,
    ) -> Result<Profile> {
        debug!("Completing onboarding as {}", role);

        let args = json!({
            "p_role": role.as_str(),
            "p_full_name": request.full_name.trim(),
            "p_phone": request.phone,
            "p_date_of_birth": request.date_of_birth,
            "p_license_number": request.license_number,
            "p_consent_text": if role == UserRole::Patient {
                Some(TELEMEDICINE_CONSENT_TEXT)
            } else {
                None
            },
            "p_ip_address": meta.ip_address,
            "p_user_agent": meta.user_agent,
        });

        let profile: Profile = self
            .supabase
            .rpc("complete_onboarding", auth_token, args)
            .await?;

        debug!("Profile created for user: {}", profile.id);
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: &str, auth_token: &str) -> Result<Option<Profile>> {
        debug!("Fetching profile: {}", user_id);

        let path = format!("/rest/v1/profiles?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match result.into_iter().next() {
            Some(row) => {
                let profile: Profile = serde_json::from_value(row)
                    .map_err(|e| anyhow!("Failed to parse profile record: {}", e))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Authoritative role lookup; `None` when the user has not
    /// completed onboarding yet.
    pub async fn get_role(&self, user_id: &str, auth_token: &str) -> Result<Option<UserRole>> {
        Ok(self
            .get_profile(user_id, auth_token)
            .await?
            .map(|profile| profile.role))
    }
}
