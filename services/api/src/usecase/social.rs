use uuid::Uuid;

use crate::domain::repository::{IdTokenVerifier, UserRepository};
use crate::domain::types::{GoogleAccount, SocialAccount, SocialProvider, User};
use crate::error::ApiError;

pub struct SocialLoginInput {
    pub provider: String,
    pub id_token: String,
}

#[derive(Debug)]
pub struct SocialLoginOutput {
    pub user_id: Uuid,
    /// The caller must go through mobile verification before any tokens are
    /// issued.
    pub mobile_required: bool,
}

pub struct SocialLoginUseCase<U, G>
where
    U: UserRepository,
    G: IdTokenVerifier,
{
    pub users: U,
    pub verifier: G,
}

impl<U, G> SocialLoginUseCase<U, G>
where
    U: UserRepository,
    G: IdTokenVerifier,
{
    pub async fn execute(&self, input: SocialLoginInput) -> Result<SocialLoginOutput, ApiError> {
        let provider = SocialProvider::parse(&input.provider).ok_or_else(|| {
            ApiError::Validation("Only the google provider is supported".to_owned())
        })?;
        let SocialProvider::Google = provider;

        let identity = self.verifier.verify_google(&input.id_token).await?;
        let account = GoogleAccount {
            id: identity.provider_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
        };

        let user = match self
            .users
            .find_by_google_or_email(&account.id, &account.email)
            .await?
        {
            Some(user) => {
                self.users
                    .link_google(user.id, &account, identity.picture.as_deref())
                    .await?;
                user
            }
            None => {
                let mut user = User::scaffold(None, None, Some(identity.email.clone()));
                user.full_name = identity.name.clone();
                user.profile_image = identity.picture.clone();
                user.social = Some(SocialAccount::Google(account));
                self.users.create(&user).await?;
                user
            }
        };

        // No tokens yet: a verified mobile number is the login credential.
        Ok(SocialLoginOutput {
            user_id: user.id,
            mobile_required: !user.mobile_verified,
        })
    }
}
