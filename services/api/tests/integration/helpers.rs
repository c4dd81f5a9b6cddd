use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use savora_api::config::TokenKeys;
use savora_api::domain::repository::{
    IdTokenVerifier, NotificationPort, UserRepository, VerificationRepository,
};
use savora_api::domain::types::{
    GoogleAccount, GoogleIdentity, SocialAccount, User, VerificationCode,
};
use savora_api::error::ApiError;
use savora_auth_types::token::JwtClaims;

pub const TEST_ACCESS_SECRET: &str = "test-access-secret-for-unit-tests-only";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret-for-unit-tests-only";

pub fn test_keys() -> TokenKeys {
    TokenKeys {
        access_secret: TEST_ACCESS_SECRET.to_owned(),
        refresh_secret: TEST_REFRESH_SECRET.to_owned(),
        access_ttl_secs: 604_800,
        refresh_ttl_secs: 2_592_000,
    }
}

/// A token for `user_id` whose expiry is far in the past (well beyond the
/// 60s validation leeway).
pub fn make_expired_token(user_id: Uuid, secret: &str) -> String {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp: 1_000_000,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.get(id))
    }

    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.mobile_number.as_deref() == Some(mobile_number))
            .cloned())
    }

    async fn find_by_email_or_mobile(
        &self,
        email: Option<&str>,
        mobile_number: &str,
    ) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                u.mobile_number.as_deref() == Some(mobile_number)
                    || (email.is_some() && u.email.as_deref() == email)
            })
            .cloned())
    }

    async fn find_by_google_or_email(
        &self,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| {
                matches!(&u.social, Some(SocialAccount::Google(g)) if g.id == google_id)
                    || u.email.as_deref() == Some(email)
            })
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn rebind_contact(
        &self,
        id: Uuid,
        mobile_number: &str,
        country_code: Option<&str>,
        email: &str,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.mobile_number = Some(mobile_number.to_owned());
            if let Some(cc) = country_code {
                u.country_code = Some(cc.to_owned());
            }
            u.email = Some(email.to_owned());
            u.mobile_verified = false;
            u.account_verified = false;
        }
        Ok(())
    }

    async fn update_contact_fields(
        &self,
        id: Uuid,
        country_code: Option<&str>,
        email: &str,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            if let Some(cc) = country_code {
                u.country_code = Some(cc.to_owned());
            }
            u.email = Some(email.to_owned());
        }
        Ok(())
    }

    async fn link_google(
        &self,
        id: Uuid,
        account: &GoogleAccount,
        profile_image: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.email = Some(account.email.clone());
            if let Some(name) = &account.name {
                u.full_name = Some(name.clone());
            }
            if let Some(picture) = profile_image {
                u.profile_image = Some(picture.to_owned());
            }
            u.social = Some(SocialAccount::Google(account.clone()));
        }
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.mobile_verified = true;
            u.account_verified = true;
            u.last_login = Some(at);
        }
        Ok(())
    }

    async fn rotate_refresh_digest(
        &self,
        id: Uuid,
        digest: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.refresh_token_digest = Some(digest.to_owned());
            u.last_login = Some(at);
        }
        Ok(())
    }

    async fn clear_refresh_digest(&self, id: Uuid) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.refresh_token_digest = None;
        }
        Ok(())
    }

    async fn find_by_id_and_digest(
        &self,
        id: Uuid,
        digest: &str,
    ) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id && u.refresh_token_digest.as_deref() == Some(digest))
            .cloned())
    }
}

// ── MockVerificationRepo ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockVerificationRepo {
    pub codes: Arc<Mutex<Vec<VerificationCode>>>,
}

impl MockVerificationRepo {
    pub fn new(codes: Vec<VerificationCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn for_user(&self, user_id: Uuid) -> Option<VerificationCode> {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id)
            .cloned()
    }
}

impl VerificationRepository for MockVerificationRepo {
    async fn replace_for_user(&self, record: &VerificationCode) -> Result<(), ApiError> {
        let mut codes = self.codes.lock().unwrap();
        codes.retain(|c| c.user_id != record.user_id);
        codes.push(record.clone());
        Ok(())
    }

    async fn find_live_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, ApiError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id && c.is_live())
            .cloned())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, ApiError> {
        let mut codes = self.codes.lock().unwrap();
        match codes.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.attempts += 1;
                Ok(Some(c.attempts))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.codes.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockNotifier {
    pub fail: bool,
    pub emails: Arc<Mutex<Vec<(String, String)>>>,
    pub sms: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockNotifier {
    pub fn working() -> Self {
        Self {
            fail: false,
            emails: Arc::new(Mutex::new(vec![])),
            sms: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::working()
        }
    }
}

impl NotificationPort for MockNotifier {
    async fn send_otp_email(&self, email: &str, code: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("email provider unavailable");
        }
        self.emails
            .lock()
            .unwrap()
            .push((email.to_owned(), code.to_owned()));
        Ok(())
    }

    async fn send_otp_sms(
        &self,
        mobile_number: &str,
        _country_code: Option<&str>,
        code: &str,
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("SMS gateway unavailable");
        }
        self.sms
            .lock()
            .unwrap()
            .push((mobile_number.to_owned(), code.to_owned()));
        Ok(())
    }
}

// ── MockGoogleVerifier ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockGoogleVerifier {
    pub identity: Option<GoogleIdentity>,
}

impl MockGoogleVerifier {
    pub fn asserting(identity: GoogleIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn rejecting() -> Self {
        Self { identity: None }
    }
}

impl IdTokenVerifier for MockGoogleVerifier {
    async fn verify_google(&self, _id_token: &str) -> Result<GoogleIdentity, ApiError> {
        self.identity.clone().ok_or(ApiError::GoogleTokenInvalid)
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(mobile_number: &str) -> User {
    User::scaffold(
        Some(mobile_number.to_owned()),
        Some("+213".to_owned()),
        Some("user@example.com".to_owned()),
    )
}

pub fn test_code(user_id: Uuid, mobile_number: &str, code: &str) -> VerificationCode {
    VerificationCode {
        id: Uuid::new_v4(),
        user_id,
        code: code.to_owned(),
        mobile_number: mobile_number.to_owned(),
        email: Some("user@example.com".to_owned()),
        expires_at: Utc::now() + Duration::seconds(600),
        attempts: 0,
        last_sent: Utc::now(),
        created_at: Utc::now(),
    }
}

pub fn test_google_identity() -> GoogleIdentity {
    GoogleIdentity {
        provider_id: "google-sub-123".to_owned(),
        email: "user@example.com".to_owned(),
        name: Some("Amine".to_owned()),
        picture: Some("https://example.com/p.jpg".to_owned()),
    }
}
