use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::types::User;
use crate::middleware::CurrentUser;

/// Client-facing projection of a user record.
///
/// Unset optional text fields render as empty strings; the mobile clients
/// predate nullable handling and expect a string there.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub profile_image: String,
    pub is_verified: bool,
    pub is_mobile_verified: bool,
    pub profile_complete: bool,
    pub wallet_balance: i64,
    pub favorite_restaurants: Vec<Uuid>,
    pub saved_addresses: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    #[serde(serialize_with = "savora_core::serde::opt_to_rfc3339_ms")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            profile_image: user.profile_image.clone().unwrap_or_default(),
            is_verified: user.account_verified,
            is_mobile_verified: user.mobile_verified,
            profile_complete: user.full_name.is_some(),
            wallet_balance: user.wallet_balance,
            favorite_restaurants: user.favorites.clone(),
            saved_addresses: user.addresses.clone(),
            device_token: user.device_token.clone(),
            last_login: user.last_login,
        }
    }
}

// ── GET /me ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserResponse,
}

pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user: UserResponse::from_user(&user),
    })
}
