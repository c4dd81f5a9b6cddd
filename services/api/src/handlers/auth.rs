use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use savora_auth_types::cookie::{clear_refresh_cookie, set_refresh_cookie};

use crate::error::ApiError;
use crate::handlers::user::UserResponse;
use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::usecase::otp::{IssueOtpInput, IssueOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};
use crate::usecase::register::{RegisterInput, RegisterUseCase};
use crate::usecase::social::{SocialLoginInput, SocialLoginUseCase};
use crate::usecase::token::{LogoutUseCase, RefreshTokenUseCase};

fn require(field: Option<String>, message: &str) -> Result<String, ApiError> {
    field
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(message.to_owned()))
}

// ── POST /send-otp ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    let mobile_number = require(body.mobile_number, "Mobile number is required")?;
    let email = require(body.email, "Email is required")?;

    let usecase = IssueOtpUseCase {
        users: state.user_repo(),
        codes: state.verification_repo(),
        notifier: state.notifier(),
    };
    let out = usecase
        .execute(IssueOtpInput {
            mobile_number,
            email,
            country_code: body.country_code,
            user_id: body.user_id,
        })
        .await?;

    let message = if out.delivered {
        "OTP sent successfully (check your email)."
    } else {
        "OTP generated but delivery failed. Check the logs or retry."
    };
    Ok(Json(SendOtpResponse {
        success: true,
        message: message.to_owned(),
        // Echoed for testability outside production only.
        otp: (!state.production).then_some(out.code),
        expires_at: out.expires_at,
        user_id: out.user_id,
    }))
}

// ── POST /verify-otp ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub mobile_number: Option<String>,
    pub otp: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(mobile_number), Some(otp)) = (
        body.mobile_number.filter(|v| !v.is_empty()),
        body.otp.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "Mobile number and OTP are required".to_owned(),
        ));
    };

    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        codes: state.verification_repo(),
        keys: state.token_keys.clone(),
    };
    let out = usecase.execute(VerifyOtpInput { mobile_number, otp }).await?;

    let jar = if state.production {
        set_refresh_cookie(
            jar,
            out.tokens.refresh_token.clone(),
            state.token_keys.refresh_ttl_secs,
            state.production,
        )
    } else {
        jar
    };

    let body = VerifyOtpResponse {
        success: true,
        message: "OTP verified successfully. User logged in.".to_owned(),
        token: out.tokens.access_token,
        refresh_token: out.tokens.refresh_token,
        user: UserResponse::from_user(&out.user),
    };
    Ok((jar, Json(body)))
}

// ── POST /register ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub country_code: Option<String>,
    pub device_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub user: UserResponse,
    pub otp_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(serialize_with = "savora_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(full_name), Some(email), Some(mobile_number)) = (
        body.full_name.filter(|v| !v.is_empty()),
        body.email.filter(|v| !v.is_empty()),
        body.mobile_number.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "Full name, email and mobile number are required".to_owned(),
        ));
    };

    let usecase = RegisterUseCase {
        users: state.user_repo(),
        codes: state.verification_repo(),
        notifier: state.notifier(),
        keys: state.token_keys.clone(),
    };
    let out = usecase
        .execute(RegisterInput {
            full_name,
            email,
            mobile_number,
            country_code: body.country_code,
            device_token: body.device_token,
        })
        .await?;

    let jar = if state.production {
        set_refresh_cookie(
            jar,
            out.tokens.refresh_token.clone(),
            state.token_keys.refresh_ttl_secs,
            state.production,
        )
    } else {
        jar
    };

    let body = RegisterResponse {
        success: true,
        token: out.tokens.access_token,
        refresh_token: out.tokens.refresh_token,
        user: UserResponse::from_user(&out.user),
        otp_sent: out.otp_sent,
        otp: (!state.production).then_some(out.code),
        expires_at: out.expires_at,
    };
    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── POST /social-login ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    pub provider: Option<String>,
    pub id_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginResponse {
    pub success: bool,
    pub message: String,
    pub user_id: Uuid,
    pub mobile_required: bool,
}

pub async fn social_login(
    State(state): State<AppState>,
    Json(body): Json<SocialLoginRequest>,
) -> Result<Json<SocialLoginResponse>, ApiError> {
    let id_token = require(body.id_token, "Google idToken is required")?;

    let usecase = SocialLoginUseCase {
        users: state.user_repo(),
        verifier: state.google_verifier(),
    };
    let out = usecase
        .execute(SocialLoginInput {
            provider: body.provider.unwrap_or_default(),
            id_token,
        })
        .await?;

    let message = if out.mobile_required {
        "Google sign-in linked. Mobile number verification required."
    } else {
        "Google sign-in successful."
    };
    Ok(Json(SocialLoginResponse {
        success: true,
        message: message.to_owned(),
        user_id: out.user_id,
        mobile_required: out.mobile_required,
    }))
}

// ── POST /refresh-token ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub success: bool,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = require(body.refresh_token, "Refresh token is required")?;

    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        keys: state.token_keys.clone(),
    };
    let out = usecase.execute(&refresh_token).await?;

    // Production delivers the rotated refresh token via cookie only; other
    // modes echo it in the body for testability.
    let (jar, echoed) = if state.production {
        (
            set_refresh_cookie(
                jar,
                out.tokens.refresh_token,
                state.token_keys.refresh_ttl_secs,
                state.production,
            ),
            None,
        )
    } else {
        (jar, Some(out.tokens.refresh_token))
    };

    let body = RefreshTokenResponse {
        success: true,
        token: out.tokens.access_token,
        refresh_token: echoed,
    };
    Ok((jar, Json(body)))
}

// ── POST /logout ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = LogoutUseCase {
        users: state.user_repo(),
    };
    usecase.execute(user.id).await?;

    let jar = clear_refresh_cookie(jar, state.production);
    Ok((
        jar,
        Json(LogoutResponse {
            success: true,
            message: "Logged out successfully".to_owned(),
        }),
    ))
}
