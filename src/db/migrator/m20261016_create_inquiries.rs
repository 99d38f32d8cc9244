use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inquiries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inquiries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inquiries::Name).string().not_null())
                    .col(ColumnDef::new(Inquiries::Email).string().not_null())
                    .col(
                        ColumnDef::new(Inquiries::Phone)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Inquiries::Message).text().not_null())
                    .col(ColumnDef::new(Inquiries::SubmittedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Listing is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_inquiries_submitted_at")
                    .table(Inquiries::Table)
                    .col(Inquiries::SubmittedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inquiries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Inquiries {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Message,
    SubmittedAt,
}
