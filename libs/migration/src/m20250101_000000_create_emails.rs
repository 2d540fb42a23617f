use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Emails::Table)
                    .if_not_exists()
                    .col(big_pk_auto(Emails::Id))
                    .col(ColumnDef::new(Emails::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Emails::Email).string_len(255).not_null())
                    .col(text(Emails::Content))
                    .col(
                        ColumnDef::new(Emails::SentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookups and counts are always by recipient
        manager
            .create_index(
                Index::create()
                    .name("idx_emails_user_id")
                    .table(Emails::Table)
                    .col(Emails::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_emails_user_id")
                    .table(Emails::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Emails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Emails {
    Table,
    Id,
    UserId,
    Email,
    Content,
    SentAt,
}
