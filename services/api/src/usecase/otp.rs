use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use savora_auth_types::digest::token_digest;

use crate::config::TokenKeys;
use crate::domain::repository::{NotificationPort, UserRepository, VerificationRepository};
use crate::domain::types::{
    MAX_VERIFY_ATTEMPTS, OTP_LEN, OTP_TTL_SECS, User, VerificationCode,
};
use crate::error::ApiError;
use crate::usecase::token::{TokenPair, mint_token_pair};

/// Charset for one-time codes (numeric digits).
const CHARSET: &[u8] = b"0123456789";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Build a fresh verification record for `user_id`, valid for 10 minutes,
/// with a zero attempt counter. Shared by the OTP issuer and registration.
pub(crate) fn new_verification_code(
    user_id: Uuid,
    mobile_number: String,
    email: Option<String>,
) -> VerificationCode {
    let now = Utc::now();
    VerificationCode {
        id: Uuid::new_v4(),
        user_id,
        code: generate_code(),
        mobile_number,
        email,
        expires_at: now + Duration::seconds(OTP_TTL_SECS),
        attempts: 0,
        last_sent: now,
        created_at: now,
    }
}

// ── IssueOtp ─────────────────────────────────────────────────────────────────

pub struct IssueOtpInput {
    pub mobile_number: String,
    pub email: String,
    pub country_code: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct IssueOtpOutput {
    pub user_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Whether the notification channel accepted the code. Metadata only;
    /// the code is issued once stored.
    pub delivered: bool,
}

pub struct IssueOtpUseCase<U, V, N>
where
    U: UserRepository,
    V: VerificationRepository,
    N: NotificationPort,
{
    pub users: U,
    pub codes: V,
    pub notifier: N,
}

impl<U, V, N> IssueOtpUseCase<U, V, N>
where
    U: UserRepository,
    V: VerificationRepository,
    N: NotificationPort,
{
    pub async fn execute(&self, input: IssueOtpInput) -> Result<IssueOtpOutput, ApiError> {
        // 1. Resolve the identity: an explicit id wins, else find-or-create
        //    by mobile number. Scaffolding fields are set only on creation.
        let user_id = match input.user_id {
            Some(id) => {
                let user = self.users.find_by_id(id).await?.ok_or_else(|| {
                    ApiError::NotFound("User not found for the provided ID".to_owned())
                })?;
                // Re-binding the contact channel invalidates prior verification.
                self.users
                    .rebind_contact(
                        user.id,
                        &input.mobile_number,
                        input.country_code.as_deref(),
                        &input.email,
                    )
                    .await?;
                user.id
            }
            None => match self.users.find_by_mobile(&input.mobile_number).await? {
                Some(user) => {
                    self.users
                        .update_contact_fields(
                            user.id,
                            input.country_code.as_deref(),
                            &input.email,
                        )
                        .await?;
                    user.id
                }
                None => {
                    let user = User::scaffold(
                        Some(input.mobile_number.clone()),
                        input.country_code.clone(),
                        Some(input.email.clone()),
                    );
                    self.users.create(&user).await?;
                    user.id
                }
            },
        };

        // 2. Upsert the single live verification record; the replacement
        //    overwrites any prior code and resets the attempt counter.
        let record =
            new_verification_code(user_id, input.mobile_number.clone(), Some(input.email.clone()));
        self.codes.replace_for_user(&record).await?;

        // 3. Best-effort delivery. A channel failure is reported as metadata,
        //    never as a request failure.
        let delivered = match self.notifier.send_otp_email(&input.email, &record.code).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "OTP email delivery failed");
                false
            }
        };

        Ok(IssueOtpOutput {
            user_id,
            code: record.code,
            expires_at: record.expires_at,
            delivered,
        })
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub mobile_number: String,
    pub otp: String,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct VerifyOtpUseCase<U, V>
where
    U: UserRepository,
    V: VerificationRepository,
{
    pub users: U,
    pub codes: V,
    pub keys: TokenKeys,
}

impl<U, V> VerifyOtpUseCase<U, V>
where
    U: UserRepository,
    V: VerificationRepository,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, ApiError> {
        let user = self
            .users
            .find_by_mobile(&input.mobile_number)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found for this number".to_owned()))?;

        let record = self
            .codes
            .find_live_by_user(user.id)
            .await?
            .ok_or(ApiError::InvalidOrExpiredOtp)?;

        // Any attempt that reaches a live record counts against the bound,
        // persisted before the bound or the code itself is evaluated.
        let attempts = self
            .codes
            .increment_attempts(record.id)
            .await?
            .ok_or(ApiError::InvalidOrExpiredOtp)?;
        if attempts > MAX_VERIFY_ATTEMPTS {
            self.codes.delete(record.id).await?;
            return Err(ApiError::TooManyAttempts);
        }

        if record.code != input.otp || record.mobile_number != input.mobile_number {
            // Undifferentiated on purpose: the caller cannot tell a wrong
            // code from an expired one.
            return Err(ApiError::InvalidOrExpiredOtp);
        }

        let now = Utc::now();
        self.users.mark_verified(user.id, now).await?;
        // Delete before minting: a given code can succeed at most once.
        self.codes.delete(record.id).await?;

        let tokens = mint_token_pair(user.id, &self.keys)?;
        self.users
            .rotate_refresh_digest(user.id, &token_digest(&tokens.refresh_token), now)
            .await?;

        let user = User {
            mobile_verified: true,
            account_verified: true,
            last_login: Some(now),
            ..user
        };
        Ok(VerifyOtpOutput { user, tokens })
    }
}
