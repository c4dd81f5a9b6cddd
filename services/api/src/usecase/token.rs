use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use savora_auth_types::digest::token_digest;
use savora_auth_types::token::{JwtClaims, validate_token};

use crate::config::TokenKeys;
use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ApiError;

/// Transient output of the token service. Never persisted as-is; only the
/// refresh token's digest reaches the store.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

fn sign(sub: Uuid, secret: &str, ttl_secs: u64) -> Result<String, ApiError> {
    let claims = JwtClaims {
        sub: sub.to_string(),
        exp: now_secs() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}

pub fn issue_access_token(user_id: Uuid, keys: &TokenKeys) -> Result<String, ApiError> {
    sign(user_id, &keys.access_secret, keys.access_ttl_secs)
}

pub fn issue_refresh_token(user_id: Uuid, keys: &TokenKeys) -> Result<String, ApiError> {
    sign(user_id, &keys.refresh_secret, keys.refresh_ttl_secs)
}

/// Mint a fresh access/refresh pair for `user_id`.
pub fn mint_token_pair(user_id: Uuid, keys: &TokenKeys) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
        access_token: issue_access_token(user_id, keys)?,
        refresh_token: issue_refresh_token(user_id, keys)?,
    })
}

// ── RefreshToken (explicit POST /refresh-token) ──────────────────────────────

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub keys: TokenKeys,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshTokenOutput, ApiError> {
        let claims = validate_token(refresh_token, &self.keys.refresh_secret)
            .map_err(|_| ApiError::RefreshTokenInvalid)?;
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ApiError::RefreshTokenInvalid)?;

        // The signature alone is not enough: the presented token must match
        // the stored digest, so a rotated-out token cannot be replayed.
        let presented = token_digest(refresh_token);
        let user = self
            .users
            .find_by_id_and_digest(user_id, &presented)
            .await?
            .ok_or(ApiError::RefreshTokenMismatch)?;

        let tokens = mint_token_pair(user.id, &self.keys)?;
        self.users
            .rotate_refresh_digest(user.id, &token_digest(&tokens.refresh_token), Utc::now())
            .await?;

        Ok(RefreshTokenOutput { user, tokens })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> LogoutUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.users.clear_refresh_digest(user_id).await
    }
}
