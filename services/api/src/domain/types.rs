use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Supported social identity providers (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
}

impl SocialProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "google" => Some(Self::Google),
            _ => None,
        }
    }
}

/// A linked social identity. One fixed record shape per provider kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocialAccount {
    Google(GoogleAccount),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAccount {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Identity asserted by a verified Google id token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub provider_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// End user. The mobile number is the primary identity key for the OTP
/// flow; social-created users start without one.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub mobile_number: Option<String>,
    pub country_code: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub profile_image: Option<String>,
    pub mobile_verified: bool,
    pub account_verified: bool,
    pub device_token: Option<String>,
    /// Wallet balance in minor currency units.
    pub wallet_balance: i64,
    pub favorites: Vec<Uuid>,
    /// Saved delivery addresses, opaque to the auth core.
    pub addresses: Value,
    pub social: Option<SocialAccount>,
    /// SHA-256 hex digest of the currently valid refresh token. At most one
    /// per user; rotated on verification/refresh, cleared on logout.
    pub refresh_token_digest: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Fresh profile scaffolding for a user first seen via an OTP request,
    /// registration, or social login. Wallet and lists start empty; the
    /// verification flags are only flipped by the OTP verifier.
    pub fn scaffold(
        mobile_number: Option<String>,
        country_code: Option<String>,
        email: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            mobile_number,
            country_code,
            email,
            full_name: None,
            profile_image: None,
            mobile_verified: false,
            account_verified: false,
            device_token: None,
            wallet_balance: 0,
            favorites: Vec::new(),
            addresses: Value::Array(Vec::new()),
            social: None,
            refresh_token_digest: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One outstanding one-time code challenge. At most one live record per
/// user; a new request replaces the prior one and resets the counter.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub mobile_number: String,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub last_sent: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_live(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// OTP length in digits.
pub const OTP_LEN: usize = 6;

/// OTP time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Failed checks beyond this bound invalidate the code record.
pub const MAX_VERIFY_ATTEMPTS: i32 = 5;
