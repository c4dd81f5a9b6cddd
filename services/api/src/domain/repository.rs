#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{GoogleAccount, GoogleIdentity, User, VerificationCode};
use crate::error::ApiError;

/// Repository for user records.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, ApiError>;

    /// Find a user holding either contact key. Used for duplicate checks.
    async fn find_by_email_or_mobile(
        &self,
        email: Option<&str>,
        mobile_number: &str,
    ) -> Result<Option<User>, ApiError>;

    /// Find a user by linked Google id, falling back to email.
    async fn find_by_google_or_email(
        &self,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError>;

    async fn create(&self, user: &User) -> Result<(), ApiError>;

    /// Re-bind the contact channel (explicit-id OTP request). Resets both
    /// verification flags: the new channel is unproven.
    async fn rebind_contact(
        &self,
        id: Uuid,
        mobile_number: &str,
        country_code: Option<&str>,
        email: &str,
    ) -> Result<(), ApiError>;

    /// Refresh secondary contact fields on a repeat OTP request. Never
    /// touches scaffolding or verification flags.
    async fn update_contact_fields(
        &self,
        id: Uuid,
        country_code: Option<&str>,
        email: &str,
    ) -> Result<(), ApiError>;

    /// Attach or update the Google identity plus profile fields.
    async fn link_google(
        &self,
        id: Uuid,
        account: &GoogleAccount,
        profile_image: Option<&str>,
    ) -> Result<(), ApiError>;

    /// Set both verification flags and stamp last-login.
    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError>;

    /// Replace the stored refresh-token digest and stamp last-login.
    async fn rotate_refresh_digest(
        &self,
        id: Uuid,
        digest: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ApiError>;

    /// Drop the stored refresh-token digest (logout).
    async fn clear_refresh_digest(&self, id: Uuid) -> Result<(), ApiError>;

    /// Find the user whose stored digest matches the presented one.
    async fn find_by_id_and_digest(
        &self,
        id: Uuid,
        digest: &str,
    ) -> Result<Option<User>, ApiError>;
}

/// Repository for one-time verification codes.
pub trait VerificationRepository: Send + Sync {
    /// Replace the user's live record (upsert semantics; the fresh record
    /// carries a zero attempt counter).
    async fn replace_for_user(&self, record: &VerificationCode) -> Result<(), ApiError>;

    /// The user's live (unexpired) record, if any.
    async fn find_live_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, ApiError>;

    /// Increment the attempt counter and persist it immediately. Returns the
    /// new count, or `None` if the record no longer exists.
    async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, ApiError>;

    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;
}

/// Outbound one-time-code delivery. Callers treat failures as metadata:
/// a code is issued once stored, delivered or not.
pub trait NotificationPort: Send + Sync {
    async fn send_otp_email(&self, email: &str, code: &str) -> anyhow::Result<()>;

    async fn send_otp_sms(
        &self,
        mobile_number: &str,
        country_code: Option<&str>,
        code: &str,
    ) -> anyhow::Result<()>;
}

/// Verifier for social-provider identity tokens.
pub trait IdTokenVerifier: Send + Sync {
    /// Validate a Google `idToken` and return the asserted identity.
    async fn verify_google(&self, id_token: &str) -> Result<GoogleIdentity, ApiError>;
}
