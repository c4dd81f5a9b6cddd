use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Backend error taxonomy.
///
/// OTP lookup failures are deliberately undifferentiated (`InvalidOrExpiredOtp`
/// covers wrong code and expired code alike) so callers cannot probe which
/// condition failed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,
    #[error("Too many failed attempts. Please request a new OTP.")]
    TooManyAttempts,
    #[error("Not authorized, token missing")]
    TokenMissing,
    #[error("Token is invalid")]
    TokenInvalid,
    #[error("Access token expired, refresh token missing")]
    RefreshTokenMissing,
    #[error("Invalid or expired refresh token")]
    RefreshTokenInvalid,
    #[error("Invalid refresh token")]
    RefreshTokenMismatch,
    #[error("Invalid or expired Google token")]
    GoogleTokenInvalid,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Refresh failures must clear the stale cookie before rejecting, or a
    /// stale client would retry the dead token on every request.
    pub fn clears_refresh_cookie(&self) -> bool {
        matches!(self, Self::RefreshTokenInvalid | Self::RefreshTokenMismatch)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::InvalidOrExpiredOtp | Self::TooManyAttempts => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TokenMissing
            | Self::TokenInvalid
            | Self::RefreshTokenMissing
            | Self::RefreshTokenInvalid
            | Self::RefreshTokenMismatch
            | Self::GoogleTokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, "internal error");
        }
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
