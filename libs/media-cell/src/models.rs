use serde::{Deserialize, Serialize};

/// Write-scoped upload grant: the browser PUTs the recorded blob
/// straight to `signed_url`, then submits `path` with the
/// consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUploadGrant {
    pub signed_url: String,
    pub path: String,
    pub token: Option<String>,
}
