use std::time::Duration;

use serde::Deserialize;

use crate::domain::repository::IdTokenVerifier;
use crate::domain::types::GoogleIdentity;
use crate::error::ApiError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Google id-token verifier backed by the tokeninfo endpoint.
///
/// Constructed once at startup with the expected OAuth client id and an
/// explicit HTTP client rather than a process-wide singleton.
#[derive(Clone)]
pub struct GoogleTokenClient {
    http: reqwest::Client,
    client_id: String,
}

#[derive(Deserialize)]
struct TokenInfoResponse {
    sub: String,
    aud: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleTokenClient {
    pub fn new(client_id: String) -> Self {
        // Provider lookups sit on the request path; keep the bound short.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");
        Self { http, client_id }
    }
}

impl IdTokenVerifier for GoogleTokenClient {
    async fn verify_google(&self, id_token: &str) -> Result<GoogleIdentity, ApiError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|_| ApiError::GoogleTokenInvalid)?;
        if !response.status().is_success() {
            return Err(ApiError::GoogleTokenInvalid);
        }
        let info: TokenInfoResponse = response
            .json()
            .await
            .map_err(|_| ApiError::GoogleTokenInvalid)?;
        // A token minted for another client id proves nothing here.
        if info.aud != self.client_id {
            return Err(ApiError::GoogleTokenInvalid);
        }
        let email = info
            .email
            .map(|e| e.to_lowercase())
            .ok_or(ApiError::GoogleTokenInvalid)?;
        Ok(GoogleIdentity {
            provider_id: info.sub,
            email,
            name: info.name,
            picture: info.picture,
        })
    }
}
