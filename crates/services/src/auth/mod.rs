//! OAuth2 credential lifecycle: load, interactive authorization, persist.

use std::path::PathBuf;
use std::sync::Arc;

use driverelay_config::DriveSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tracing::{info, warn};

use crate::cloud_storage::{ProviderError, StorageProvider};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Client secret error: {0}")]
    ClientSecret(String),
    #[error("Token persistence error: {0}")]
    Persist(#[from] std::io::Error),
    #[error("Credential serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Code exchange failed: {0}")]
    Exchange(#[from] ProviderError),
    #[error("No refresh token in authorization response")]
    NoRefreshToken,
    #[error("Interactive authorization failed: {0}")]
    Interactive(String),
}

/// The persisted `token.json` record. At most one exists per process; token
/// freshness is delegated to the provider's token endpoint at use time, so
/// nothing here expires locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredential {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// One key block of the provider-issued client secret file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretKey {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// `credentials.json` wrapper: desktop clients use `installed`, server
/// clients use `web`.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecretKey>,
    web: Option<ClientSecretKey>,
}

impl ClientSecretFile {
    fn into_key(self) -> Option<ClientSecretKey> {
        self.installed.or(self.web)
    }
}

/// Produces a usable credential for every upload attempt, with at most one
/// interactive authorization flow in flight per process.
///
/// State machine: no stored credential means unauthenticated; `authorize`
/// then opens a pending flow and waits for the consent callback. A stored
/// credential short-circuits everything. Unreadable state falls back to
/// re-authorization rather than failing.
pub struct AuthorizationManager {
    provider: Arc<dyn StorageProvider>,
    credentials_path: PathBuf,
    token_path: PathBuf,
    redirect_uri: String,
    // Single-flight guard: the slot holds the sender of the one pending
    // interactive flow; waiters subscribe to it instead of opening another.
    pending: Mutex<Option<broadcast::Sender<StoredCredential>>>,
}

impl AuthorizationManager {
    pub fn new(provider: Arc<dyn StorageProvider>, drive: &DriveSettings) -> Self {
        Self {
            provider,
            credentials_path: PathBuf::from(&drive.credentials_path),
            token_path: PathBuf::from(&drive.token_path),
            redirect_uri: drive.redirect_uri.clone(),
            pending: Mutex::new(None),
        }
    }

    /// Load the stored credential, or run the interactive flow to obtain one.
    ///
    /// Concurrent callers that miss the stored credential all await the same
    /// pending flow; the consent callback resolves them together.
    pub async fn authorize(&self) -> Result<StoredCredential, AuthError> {
        if let Some(credential) = self.load_saved_credentials().await {
            return Ok(credential);
        }

        let mut rx = {
            let mut pending = self.pending.lock().await;
            // Re-check under the lock: a callback may have landed meanwhile.
            if let Some(credential) = self.load_saved_credentials().await {
                return Ok(credential);
            }
            match pending.as_ref() {
                Some(tx) => tx.subscribe(),
                None => {
                    let key = self.load_client_secret().await?;
                    let url = self
                        .provider
                        .authorize_url(&key.client_id, &self.redirect_uri);
                    info!(
                        provider = self.provider.provider_name(),
                        %url,
                        "authorization required, waiting for consent callback"
                    );
                    let (tx, rx) = broadcast::channel(1);
                    *pending = Some(tx);
                    rx
                }
            }
        };

        rx.recv()
            .await
            .map_err(|_| AuthError::Interactive("authorization flow abandoned".to_string()))
    }

    /// Complete a pending interactive flow with the authorization code
    /// delivered to the callback endpoint. Persists the credential and wakes
    /// every caller waiting on `authorize`.
    pub async fn handle_authorization_callback(
        &self,
        code: &str,
    ) -> Result<StoredCredential, AuthError> {
        let key = self.load_client_secret().await?;
        let tokens = self
            .provider
            .exchange_code(&key.client_id, &key.client_secret, code, &self.redirect_uri)
            .await?;
        let refresh_token = tokens.refresh_token.ok_or(AuthError::NoRefreshToken)?;

        let credential = self.save_credentials(&refresh_token).await?;

        if let Some(tx) = self.pending.lock().await.take() {
            // Waiters may have given up; delivery failure is not an error.
            let _ = tx.send(credential.clone());
        }

        info!(
            provider = self.provider.provider_name(),
            "authorization complete, credential persisted"
        );
        Ok(credential)
    }

    /// Serialize the authorized-user record and atomically replace
    /// `token.json` (write a sibling temp file, then rename), so a racing
    /// reader never observes a partial write.
    pub async fn save_credentials(
        &self,
        refresh_token: &str,
    ) -> Result<StoredCredential, AuthError> {
        let key = self.load_client_secret().await?;
        let credential = StoredCredential {
            credential_type: "authorized_user".to_string(),
            client_id: key.client_id,
            client_secret: key.client_secret,
            refresh_token: refresh_token.to_string(),
        };

        let payload = serde_json::to_vec(&credential)?;
        let tmp_path = self.token_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &payload).await?;
        tokio::fs::rename(&tmp_path, &self.token_path).await?;

        Ok(credential)
    }

    /// Load the persisted credential if present and parseable. Missing or
    /// corrupt state means unauthenticated, never an error.
    pub async fn load_saved_credentials(&self) -> Option<StoredCredential> {
        let content = tokio::fs::read(&self.token_path).await.ok()?;
        match serde_json::from_slice(&content) {
            Ok(credential) => Some(credential),
            Err(err) => {
                warn!(
                    path = %self.token_path.display(),
                    %err,
                    "stored credential unreadable, falling back to re-authorization"
                );
                None
            }
        }
    }

    async fn load_client_secret(&self) -> Result<ClientSecretKey, AuthError> {
        let content = tokio::fs::read(&self.credentials_path).await.map_err(|err| {
            AuthError::ClientSecret(format!("{}: {err}", self.credentials_path.display()))
        })?;
        let file: ClientSecretFile = serde_json::from_slice(&content)
            .map_err(|err| AuthError::ClientSecret(format!("malformed client secret file: {err}")))?;
        file.into_key().ok_or_else(|| {
            AuthError::ClientSecret("expected an `installed` or `web` key".to_string())
        })
    }
}
