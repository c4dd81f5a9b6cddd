use chrono::{DateTime, Utc};

use savora_auth_types::digest::token_digest;

use crate::config::TokenKeys;
use crate::domain::repository::{NotificationPort, UserRepository, VerificationRepository};
use crate::domain::types::User;
use crate::error::ApiError;
use crate::usecase::otp::new_verification_code;
use crate::usecase::token::{TokenPair, mint_token_pair};

pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub country_code: Option<String>,
    pub device_token: Option<String>,
}

#[derive(Debug)]
pub struct RegisterOutput {
    pub user: User,
    pub tokens: TokenPair,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    /// Whether the SMS channel accepted the code (metadata only).
    pub otp_sent: bool,
}

pub struct RegisterUseCase<U, V, N>
where
    U: UserRepository,
    V: VerificationRepository,
    N: NotificationPort,
{
    pub users: U,
    pub codes: V,
    pub notifier: N,
    pub keys: TokenKeys,
}

impl<U, V, N> RegisterUseCase<U, V, N>
where
    U: UserRepository,
    V: VerificationRepository,
    N: NotificationPort,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<RegisterOutput, ApiError> {
        if let Some(existing) = self
            .users
            .find_by_email_or_mobile(Some(&input.email), &input.mobile_number)
            .await?
        {
            let message = if existing.email.as_deref() == Some(input.email.as_str()) {
                "Email already in use"
            } else {
                "Mobile number already in use"
            };
            return Err(ApiError::Validation(message.to_owned()));
        }

        let mut user = User::scaffold(
            Some(input.mobile_number.clone()),
            input.country_code.clone(),
            Some(input.email.clone()),
        );
        user.full_name = Some(input.full_name);
        user.device_token = input.device_token;
        self.users.create(&user).await?;

        let record =
            new_verification_code(user.id, input.mobile_number.clone(), Some(input.email));
        self.codes.replace_for_user(&record).await?;

        let otp_sent = match self
            .notifier
            .send_otp_sms(
                &input.mobile_number,
                input.country_code.as_deref(),
                &record.code,
            )
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "OTP SMS delivery failed");
                false
            }
        };

        // The account is usable immediately; mobile verification follows via
        // the code that was just issued.
        let now = Utc::now();
        let tokens = mint_token_pair(user.id, &self.keys)?;
        self.users
            .rotate_refresh_digest(user.id, &token_digest(&tokens.refresh_token), now)
            .await?;
        user.last_login = Some(now);

        Ok(RegisterOutput {
            user,
            tokens,
            code: record.code,
            expires_at: record.expires_at,
            otp_sent,
        })
    }
}
