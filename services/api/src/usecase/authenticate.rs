use chrono::Utc;
use uuid::Uuid;

use savora_auth_types::digest::token_digest;
use savora_auth_types::token::{AuthError, validate_access_token, validate_token};

use crate::config::TokenKeys;
use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ApiError;
use crate::usecase::token::{TokenPair, mint_token_pair};

/// Result of gatekeeping one request. `rotated` is set only when an expired
/// access token was transparently refreshed; the adapter must then surface
/// the new pair to the client (refresh cookie + `X-Access-Token` header).
#[derive(Debug)]
pub struct AuthOutcome {
    pub user: User,
    pub rotated: Option<TokenPair>,
}

/// Per-request session authenticator with single-shot lazy refresh.
///
/// States: no token, valid access, expired access (with/without a refresh
/// cookie), invalid refresh, authenticated, rejected. One refresh attempt
/// at most; the request pipeline stops on rejection.
pub struct AuthenticateUseCase<U: UserRepository> {
    pub users: U,
    pub keys: TokenKeys,
}

impl<U: UserRepository> AuthenticateUseCase<U> {
    pub async fn execute(
        &self,
        bearer: Option<&str>,
        refresh_cookie: Option<&str>,
    ) -> Result<AuthOutcome, ApiError> {
        let access_token = bearer.ok_or(ApiError::TokenMissing)?;

        match validate_access_token(access_token, &self.keys.access_secret) {
            Ok(info) => {
                let user = self
                    .users
                    .find_by_id(info.user_id)
                    .await?
                    .ok_or(ApiError::TokenInvalid)?;
                Ok(AuthOutcome {
                    user,
                    rotated: None,
                })
            }
            // Expiry is the only failure worth a refresh; a bad signature or
            // malformed token is rejected with no refresh attempt.
            Err(AuthError::Expired) => self.refresh(refresh_cookie).await,
            Err(_) => Err(ApiError::TokenInvalid),
        }
    }

    async fn refresh(&self, refresh_cookie: Option<&str>) -> Result<AuthOutcome, ApiError> {
        let refresh_token = refresh_cookie.ok_or(ApiError::RefreshTokenMissing)?;

        let claims = validate_token(refresh_token, &self.keys.refresh_secret)
            .map_err(|_| ApiError::RefreshTokenInvalid)?;
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ApiError::RefreshTokenInvalid)?;

        let presented = token_digest(refresh_token);
        let user = self
            .users
            .find_by_id_and_digest(user_id, &presented)
            .await?
            .ok_or(ApiError::RefreshTokenMismatch)?;

        // Rotation: the presented token dies with this refresh.
        let tokens = mint_token_pair(user.id, &self.keys)?;
        self.users
            .rotate_refresh_digest(user.id, &token_digest(&tokens.refresh_token), Utc::now())
            .await?;

        Ok(AuthOutcome {
            user,
            rotated: Some(tokens),
        })
    }
}
