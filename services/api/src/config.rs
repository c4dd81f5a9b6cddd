/// Backend configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 5000). Env var: `PORT`.
    pub port: u16,
    /// HMAC secret for signing access tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing refresh tokens.
    ///
    /// The legacy deployment silently reused the access secret when this was
    /// unset. Reusing it now requires the explicit
    /// `ALLOW_SHARED_TOKEN_SECRET=true` opt-in; otherwise startup fails.
    pub refresh_token_secret: String,
    /// Access-token lifetime in seconds (default 7 days).
    pub access_token_ttl_secs: u64,
    /// Refresh-token lifetime in seconds (default 30 days).
    pub refresh_token_ttl_secs: u64,
    /// Production mode: raw OTPs and refresh tokens are withheld from
    /// response bodies, and cookies are cross-site secure. Env var: `RUN_MODE`.
    pub production: bool,
    /// OAuth client id the Google id-token audience must match.
    pub google_client_id: String,
    /// Transactional-email provider API key (OTP email delivery).
    pub brevo_api_key: String,
    /// Sender address for OTP emails.
    pub brevo_sender_email: String,
    /// SMS gateway endpoint for OTP SMS delivery.
    pub sms_api_url: String,
    /// SMS gateway API key.
    pub sms_api_key: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let access_token_secret =
            std::env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET");
        let refresh_token_secret = match std::env::var("REFRESH_TOKEN_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                let opted_in = std::env::var("ALLOW_SHARED_TOKEN_SECRET")
                    .map(|v| v == "true")
                    .unwrap_or(false);
                assert!(
                    opted_in,
                    "REFRESH_TOKEN_SECRET is unset; set it or opt in with ALLOW_SHARED_TOKEN_SECRET=true"
                );
                access_token_secret.clone()
            }
        };
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604_800),
            refresh_token_ttl_secs: std::env::var("REFRESH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2_592_000),
            production: std::env::var("RUN_MODE")
                .map(|v| v == "production")
                .unwrap_or(false),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID"),
            brevo_api_key: std::env::var("BREVO_API_KEY").expect("BREVO_API_KEY"),
            brevo_sender_email: std::env::var("BREVO_SENDER_EMAIL").expect("BREVO_SENDER_EMAIL"),
            sms_api_url: std::env::var("SMS_API_URL").expect("SMS_API_URL"),
            sms_api_key: std::env::var("SMS_API_KEY").expect("SMS_API_KEY"),
        }
    }

    /// Token signing material derived from this config.
    pub fn token_keys(&self) -> TokenKeys {
        TokenKeys {
            access_secret: self.access_token_secret.clone(),
            refresh_secret: self.refresh_token_secret.clone(),
            access_ttl_secs: self.access_token_ttl_secs,
            refresh_ttl_secs: self.refresh_token_ttl_secs,
        }
    }
}

/// Signing secrets and lifetimes for the access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenKeys {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}
