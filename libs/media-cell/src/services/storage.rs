use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::SignedUploadGrant;

/// Bucket holding recorded consultation videos, keyed
/// `{user_id}/{random_id}.webm`.
pub const VIDEO_BUCKET: &str = "consultation-videos";

/// Lifetime of signed playback URLs.
pub const PLAYBACK_URL_TTL_SECONDS: u32 = 3600;

pub struct StorageService {
    supabase: SupabaseClient,
}

impl StorageService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Issue a short-lived write URL for a fresh per-user object path.
    pub async fn create_video_upload_grant(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<SignedUploadGrant> {
        let path = format!("{}/{}.webm", user_id, Uuid::new_v4());
        debug!("Creating signed upload URL for {}", path);

        let (signed_url, token) = self
            .supabase
            .create_signed_upload_url(VIDEO_BUCKET, &path, auth_token)
            .await?;

        Ok(SignedUploadGrant {
            signed_url,
            path,
            token,
        })
    }

    /// Time-limited read URL for a stored video.
    pub async fn signed_playback_url(&self, object_path: &str, auth_token: &str) -> Result<String> {
        self.supabase
            .create_signed_url(VIDEO_BUCKET, object_path, PLAYBACK_URL_TTL_SECONDS, auth_token)
            .await
    }
}
