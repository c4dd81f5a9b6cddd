use sea_orm::entity::prelude::*;

/// End-user record. The mobile number is the primary identity key for the
/// OTP flow; social-created users start without one and acquire it through
/// mobile verification.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub mobile_number: Option<String>,
    pub country_code: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub profile_image: Option<String>,
    pub mobile_verified: bool,
    pub account_verified: bool,
    pub device_token: Option<String>,
    /// Wallet balance in minor currency units.
    pub wallet_balance: i64,
    /// JSON array of favorite menu-item ids.
    pub favorites: Json,
    /// JSON array of saved delivery addresses (opaque to the auth core).
    pub addresses: Json,
    pub google_id: Option<String>,
    pub google_email: Option<String>,
    pub google_name: Option<String>,
    /// SHA-256 hex digest of the currently valid refresh token, if any.
    pub refresh_token_digest: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::verification_codes::Entity")]
    VerificationCodes,
}

impl Related<super::verification_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
