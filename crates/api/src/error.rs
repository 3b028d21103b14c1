use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Request-boundary errors, rendered as the plain-text bodies the HTTP
/// surface promises. Authorization, local I/O, and remote failures during an
/// upload all conflate to `UploadFailed`; callers cannot tell them apart and
/// the detail lives in the logs only.
#[derive(Debug)]
pub enum ApiError {
    MissingFields,
    UploadFailed,
    AuthenticationFailed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields"),
            ApiError::UploadFailed => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to upload file"),
            ApiError::AuthenticationFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
        };

        (status, body).into_response()
    }
}
