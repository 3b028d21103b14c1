use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::error;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// GET /oauth2callback?code=...
/// Completes the pending interactive authorization flow.
pub async fn oauth2_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<&'static str, ApiError> {
    // An absent code reaches the exchange as empty and fails there, keeping
    // one failure path for the whole callback.
    let code = params.code.unwrap_or_default();

    state
        .auth
        .handle_authorization_callback(&code)
        .await
        .map_err(|err| {
            error!(%err, "OAuth2 callback failed");
            ApiError::AuthenticationFailed
        })?;

    Ok("Authentication successful! Please return to the console.")
}
