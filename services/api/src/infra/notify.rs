use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use crate::domain::repository::NotificationPort;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// OTP delivery over HTTP providers: transactional email (Brevo) and a
/// generic SMS gateway. Callers treat both as best-effort.
#[derive(Clone)]
pub struct HttpNotifier {
    http: reqwest::Client,
    brevo_api_key: String,
    brevo_sender_email: String,
    sms_api_url: String,
    sms_api_key: String,
}

#[derive(Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    text_content: String,
}

#[derive(Serialize)]
struct SendSmsBody {
    to: String,
    message: String,
}

impl HttpNotifier {
    pub fn new(
        brevo_api_key: String,
        brevo_sender_email: String,
        sms_api_url: String,
        sms_api_key: String,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self {
            http,
            brevo_api_key,
            brevo_sender_email,
            sms_api_url,
            sms_api_key,
        }
    }
}

impl NotificationPort for HttpNotifier {
    async fn send_otp_email(&self, email: &str, code: &str) -> anyhow::Result<()> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.brevo_sender_email.clone(),
            },
            to: vec![EmailAddress {
                email: email.to_owned(),
            }],
            subject: "Your verification code".to_owned(),
            text_content: format!(
                "Your verification code is {code}. It expires in 10 minutes."
            ),
        };
        let response = self
            .http
            .post(BREVO_SEND_URL)
            .header("api-key", &self.brevo_api_key)
            .json(&body)
            .send()
            .await
            .context("send OTP email")?;
        if !response.status().is_success() {
            anyhow::bail!("email provider returned {}", response.status());
        }
        Ok(())
    }

    async fn send_otp_sms(
        &self,
        mobile_number: &str,
        country_code: Option<&str>,
        code: &str,
    ) -> anyhow::Result<()> {
        let to = format!("{}{}", country_code.unwrap_or_default(), mobile_number);
        let body = SendSmsBody {
            to,
            message: format!("Your verification code is {code}. It expires in 10 minutes."),
        };
        let response = self
            .http
            .post(&self.sms_api_url)
            .bearer_auth(&self.sms_api_key)
            .json(&body)
            .send()
            .await
            .context("send OTP SMS")?;
        if !response.status().is_success() {
            anyhow::bail!("SMS gateway returned {}", response.status());
        }
        Ok(())
    }
}
