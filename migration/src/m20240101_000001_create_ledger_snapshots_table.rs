use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerSnapshots::StorageKey)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // Serialized ledger blob, unversioned
                    .col(ColumnDef::new(LedgerSnapshots::Payload).text().not_null())
                    .col(
                        ColumnDef::new(LedgerSnapshots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerSnapshots::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LedgerSnapshots {
    Table,
    StorageKey,
    Payload,
    UpdatedAt,
}
