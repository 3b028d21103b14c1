use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{Body, Client, header::CONTENT_TYPE};
use tokio_util::io::ReaderStream;

use super::{OAuthTokens, ProviderError, StorageProvider, UploadMetadata};
use crate::auth::StoredCredential;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

// Boundary for the multipart/related upload body.
const BOUNDARY: &str = "driverelay-5c3f1a9d";

pub struct GoogleDriveService {
    client: Client,
    scope: String,
}

impl GoogleDriveService {
    pub fn new(scope: String) -> Self {
        Self {
            client: Client::new(),
            scope,
        }
    }

    /// Redeem the stored refresh token for a fresh access token. Token
    /// freshness is delegated entirely to the token endpoint; nothing is
    /// cached locally.
    async fn access_token(&self, credential: &StoredCredential) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
                ("refresh_token", credential.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::TokenExchange(format!("{status}: {body}")));
        }

        let json: serde_json::Value = resp.json().await?;
        json["access_token"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ProviderError::TokenExchange("no access_token in token response".to_string())
            })
    }
}

#[async_trait]
impl StorageProvider for GoogleDriveService {
    fn provider_name(&self) -> &str {
        "google_drive"
    }

    fn authorize_url(&self, client_id: &str, redirect_uri: &str) -> String {
        format!(
            "{AUTH_URL}?client_id={client_id}&redirect_uri={redirect_uri}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.scope
        )
    }

    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthTokens, ProviderError> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::TokenExchange(format!("{status}: {body}")));
        }

        let json: serde_json::Value = resp.json().await?;
        Ok(OAuthTokens {
            access_token: json["access_token"].as_str().unwrap_or("").to_string(),
            refresh_token: json["refresh_token"].as_str().map(|s| s.to_string()),
            expires_in: json["expires_in"].as_i64(),
        })
    }

    async fn upload_file(
        &self,
        credential: &StoredCredential,
        metadata: &UploadMetadata,
        source: &Path,
    ) -> Result<String, ProviderError> {
        let token = self.access_token(credential).await?;

        let file = tokio::fs::File::open(source).await?;

        // multipart/related: a JSON metadata part followed by the media part,
        // with the file streamed from disk rather than buffered.
        let file_metadata = serde_json::json!({
            "name": metadata.file_name,
            "parents": [metadata.parent_id],
        });
        let preamble = format!(
            "--{BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{file_metadata}\r\n--{BOUNDARY}\r\nContent-Type: {}\r\n\r\n",
            metadata.mime_type
        );
        let epilogue = format!("\r\n--{BOUNDARY}--\r\n");

        let body_stream = futures::stream::once(async move {
            Ok::<Bytes, std::io::Error>(Bytes::from(preamble))
        })
        .chain(ReaderStream::new(file))
        .chain(futures::stream::once(async move {
            Ok(Bytes::from(epilogue))
        }));

        let resp = self
            .client
            .post(UPLOAD_URL)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .bearer_auth(&token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(Body::wrap_stream(body_stream))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let json: serde_json::Value = resp.json().await?;
        json["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::Api {
                status: 200,
                body: "no id in create response".to_string(),
            })
    }
}
