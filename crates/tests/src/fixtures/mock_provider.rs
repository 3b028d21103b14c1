use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use driverelay_services::auth::StoredCredential;
use driverelay_services::cloud_storage::{
    OAuthTokens, ProviderError, StorageProvider, UploadMetadata,
};

/// Scripted provider: counts calls, rejects the authorization code
/// `"invalid"`, and can be flipped to fail uploads.
pub struct MockProvider {
    pub exchange_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub fail_uploads: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            exchange_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
        }
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn authorize_url(&self, client_id: &str, redirect_uri: &str) -> String {
        format!("http://mock.invalid/auth?client_id={client_id}&redirect_uri={redirect_uri}")
    }

    async fn exchange_code(
        &self,
        _client_id: &str,
        _client_secret: &str,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<OAuthTokens, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if code.is_empty() || code == "invalid" {
            return Err(ProviderError::TokenExchange("invalid_grant".to_string()));
        }
        Ok(OAuthTokens {
            access_token: "mock-access".to_string(),
            refresh_token: Some("mock-refresh".to_string()),
            expires_in: Some(3600),
        })
    }

    async fn upload_file(
        &self,
        _credential: &StoredCredential,
        metadata: &UploadMetadata,
        source: &Path,
    ) -> Result<String, ProviderError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        // The real provider streams the source file; at least require it.
        tokio::fs::metadata(source).await?;
        Ok(format!("mock-{}", metadata.file_name))
    }
}
