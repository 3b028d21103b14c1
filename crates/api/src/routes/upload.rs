use std::path::PathBuf;

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::{error, info};

use crate::{error::ApiError, state::AppState};
use driverelay_services::cloud_storage::UploadMetadata;

/// POST /upload
/// Relay the configured local file to the storage provider under the
/// requested name/parent/mime type.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: Option<String>,
    pub parent_id: Option<String>,
    pub mime_type: Option<String>,
}

pub async fn upload(
    State(state): State<AppState>,
    Json(body): Json<UploadRequest>,
) -> Result<String, ApiError> {
    info!(?body, "received upload request");

    let metadata = match (&body.file_name, &body.parent_id, &body.mime_type) {
        (Some(file_name), Some(parent_id), Some(mime_type))
            if !file_name.is_empty() && !parent_id.is_empty() && !mime_type.is_empty() =>
        {
            UploadMetadata {
                file_name: file_name.clone(),
                parent_id: parent_id.clone(),
                mime_type: mime_type.clone(),
            }
        }
        _ => {
            info!(?body, "rejecting upload with missing fields");
            return Err(ApiError::MissingFields);
        }
    };

    let credential = state.auth.authorize().await.map_err(|err| {
        error!(%err, "authorization failed during upload");
        ApiError::UploadFailed
    })?;

    let source = PathBuf::from(&state.settings.drive.source_path);
    let id = state
        .storage
        .upload_file(&credential, &metadata, &source)
        .await
        .map_err(|err| {
            error!(%err, file_name = %metadata.file_name, "upload to storage provider failed");
            ApiError::UploadFailed
        })?;

    Ok(format!("File uploaded with ID: {id}"))
}
