use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use savora_api_schema::{users, verification_codes};

use crate::domain::repository::{UserRepository, VerificationRepository};
use crate::domain::types::{GoogleAccount, SocialAccount, User, VerificationCode};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_mobile(&self, mobile_number: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::MobileNumber.eq(mobile_number))
            .one(&self.db)
            .await
            .context("find user by mobile")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email_or_mobile(
        &self,
        email: Option<&str>,
        mobile_number: &str,
    ) -> Result<Option<User>, ApiError> {
        let mut condition = Condition::any().add(users::Column::MobileNumber.eq(mobile_number));
        if let Some(email) = email {
            condition = condition.add(users::Column::Email.eq(email));
        }
        let model = users::Entity::find()
            .filter(condition)
            .one(&self.db)
            .await
            .context("find user by email or mobile")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_google_or_email(
        &self,
        google_id: &str,
        email: &str,
    ) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::GoogleId.eq(google_id))
                    .add(users::Column::Email.eq(email)),
            )
            .one(&self.db)
            .await
            .context("find user by google id or email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        let (google_id, google_email, google_name) = social_columns(user.social.as_ref());
        users::ActiveModel {
            id: Set(user.id),
            mobile_number: Set(user.mobile_number.clone()),
            country_code: Set(user.country_code.clone()),
            email: Set(user.email.clone()),
            full_name: Set(user.full_name.clone()),
            profile_image: Set(user.profile_image.clone()),
            mobile_verified: Set(user.mobile_verified),
            account_verified: Set(user.account_verified),
            device_token: Set(user.device_token.clone()),
            wallet_balance: Set(user.wallet_balance),
            favorites: Set(serde_json::json!(user.favorites)),
            addresses: Set(user.addresses.clone()),
            google_id: Set(google_id),
            google_email: Set(google_email),
            google_name: Set(google_name),
            refresh_token_digest: Set(user.refresh_token_digest.clone()),
            last_login: Set(user.last_login),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn rebind_contact(
        &self,
        id: Uuid,
        mobile_number: &str,
        country_code: Option<&str>,
        email: &str,
    ) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            mobile_number: Set(Some(mobile_number.to_owned())),
            email: Set(Some(email.to_owned())),
            mobile_verified: Set(false),
            account_verified: Set(false),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(country_code) = country_code {
            am.country_code = Set(Some(country_code.to_owned()));
        }
        am.update(&self.db).await.context("rebind user contact")?;
        Ok(())
    }

    async fn update_contact_fields(
        &self,
        id: Uuid,
        country_code: Option<&str>,
        email: &str,
    ) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            email: Set(Some(email.to_owned())),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(country_code) = country_code {
            am.country_code = Set(Some(country_code.to_owned()));
        }
        am.update(&self.db)
            .await
            .context("update user contact fields")?;
        Ok(())
    }

    async fn link_google(
        &self,
        id: Uuid,
        account: &GoogleAccount,
        profile_image: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut am = users::ActiveModel {
            id: Set(id),
            email: Set(Some(account.email.clone())),
            google_id: Set(Some(account.id.clone())),
            google_email: Set(Some(account.email.clone())),
            google_name: Set(account.name.clone()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(name) = &account.name {
            am.full_name = Set(Some(name.clone()));
        }
        if let Some(picture) = profile_image {
            am.profile_image = Set(Some(picture.to_owned()));
        }
        am.update(&self.db).await.context("link google account")?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            mobile_verified: Set(true),
            account_verified: Set(true),
            last_login: Set(Some(at)),
            updated_at: Set(at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark user verified")?;
        Ok(())
    }

    async fn rotate_refresh_digest(
        &self,
        id: Uuid,
        digest: &str,
        at: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            refresh_token_digest: Set(Some(digest.to_owned())),
            last_login: Set(Some(at)),
            updated_at: Set(at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("rotate refresh digest")?;
        Ok(())
    }

    async fn clear_refresh_digest(&self, id: Uuid) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            refresh_token_digest: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("clear refresh digest")?;
        Ok(())
    }

    async fn find_by_id_and_digest(
        &self,
        id: Uuid,
        digest: &str,
    ) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::RefreshTokenDigest.eq(digest))
            .one(&self.db)
            .await
            .context("find user by id and refresh digest")?;
        Ok(model.map(user_from_model))
    }
}

fn social_columns(
    social: Option<&SocialAccount>,
) -> (Option<String>, Option<String>, Option<String>) {
    match social {
        Some(SocialAccount::Google(google)) => (
            Some(google.id.clone()),
            Some(google.email.clone()),
            google.name.clone(),
        ),
        None => (None, None, None),
    }
}

fn user_from_model(model: users::Model) -> User {
    let social = model.google_id.map(|id| {
        SocialAccount::Google(GoogleAccount {
            id,
            email: model.google_email.unwrap_or_default(),
            name: model.google_name,
        })
    });
    User {
        id: model.id,
        mobile_number: model.mobile_number,
        country_code: model.country_code,
        email: model.email,
        full_name: model.full_name,
        profile_image: model.profile_image,
        mobile_verified: model.mobile_verified,
        account_verified: model.account_verified,
        device_token: model.device_token,
        wallet_balance: model.wallet_balance,
        favorites: serde_json::from_value(model.favorites).unwrap_or_default(),
        addresses: model.addresses,
        social,
        refresh_token_digest: model.refresh_token_digest,
        last_login: model.last_login,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Verification repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationRepository {
    pub db: DatabaseConnection,
}

impl VerificationRepository for DbVerificationRepository {
    async fn replace_for_user(&self, record: &VerificationCode) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    delete_codes_for_user(txn, record.user_id).await?;
                    insert_code(txn, &record).await?;
                    Ok(())
                })
            })
            .await
            .context("replace verification code")?;
        Ok(())
    }

    async fn find_live_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, ApiError> {
        let now = Utc::now();
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find live verification code")?;
        Ok(model.map(code_from_model))
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<Option<i32>, ApiError> {
        let Some(model) = verification_codes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("load verification code for increment")?
        else {
            return Ok(None);
        };
        let attempts = model.attempts + 1;
        verification_codes::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("increment verification attempts")?;
        Ok(Some(attempts))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        verification_codes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete verification code")?;
        Ok(())
    }
}

async fn delete_codes_for_user(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> Result<(), sea_orm::DbErr> {
    verification_codes::Entity::delete_many()
        .filter(verification_codes::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    Ok(())
}

async fn insert_code(
    txn: &DatabaseTransaction,
    record: &VerificationCode,
) -> Result<(), sea_orm::DbErr> {
    verification_codes::ActiveModel {
        id: Set(record.id),
        user_id: Set(record.user_id),
        code: Set(record.code.clone()),
        mobile_number: Set(record.mobile_number.clone()),
        email: Set(record.email.clone()),
        expires_at: Set(record.expires_at),
        attempts: Set(record.attempts),
        last_sent: Set(record.last_sent),
        created_at: Set(record.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn code_from_model(model: verification_codes::Model) -> VerificationCode {
    VerificationCode {
        id: model.id,
        user_id: model.user_id,
        code: model.code,
        mobile_number: model.mobile_number,
        email: model.email,
        expires_at: model.expires_at,
        attempts: model.attempts,
        last_sent: model.last_sent,
        created_at: model.created_at,
    }
}
