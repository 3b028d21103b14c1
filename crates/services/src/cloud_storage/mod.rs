pub mod google_drive;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::StoredCredential;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Remote API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Metadata for one create-file call, as validated at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub file_name: String,
    pub parent_id: String,
    pub mime_type: String,
}

/// Common trait for cloud storage providers.
///
/// Client id/secret are passed per call because they live in the externally
/// provisioned client secret file owned by the `AuthorizationManager`, not in
/// the provider itself.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Consent URL the user must visit to start the interactive flow.
    fn authorize_url(&self, client_id: &str, redirect_uri: &str) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokens, ProviderError>;

    /// Create a remote file from local `source` with `metadata`, returning
    /// the provider-generated file id.
    async fn upload_file(
        &self,
        credential: &StoredCredential,
        metadata: &UploadMetadata,
        source: &Path,
    ) -> Result<String, ProviderError>;
}
