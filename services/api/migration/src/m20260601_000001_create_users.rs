use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::MobileNumber)
                            .string()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::CountryCode).string())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::FullName).string())
                    .col(ColumnDef::new(Users::ProfileImage).string())
                    .col(
                        ColumnDef::new(Users::MobileVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::AccountVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::DeviceToken).string())
                    .col(
                        ColumnDef::new(Users::WalletBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::Favorites).json_binary().not_null())
                    .col(ColumnDef::new(Users::Addresses).json_binary().not_null())
                    .col(ColumnDef::new(Users::GoogleId).string())
                    .col(ColumnDef::new(Users::GoogleEmail).string())
                    .col(ColumnDef::new(Users::GoogleName).string())
                    .col(ColumnDef::new(Users::RefreshTokenDigest).string())
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::GoogleId)
                    .name("idx_users_google_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Users::Table)
                    .col(Users::Email)
                    .name("idx_users_email")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    MobileNumber,
    CountryCode,
    Email,
    FullName,
    ProfileImage,
    MobileVerified,
    AccountVerified,
    DeviceToken,
    WalletBalance,
    Favorites,
    Addresses,
    GoogleId,
    GoogleEmail,
    GoogleName,
    RefreshTokenDigest,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}
