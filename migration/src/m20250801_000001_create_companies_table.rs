use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 会社（テナント）テーブルの作成
        manager
            .create_table(
                Table::create()
                    .table(Empresas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Empresas::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Empresas::NomeEmpresa).string().not_null())
                    .col(
                        ColumnDef::new(Empresas::CnpjEmpresa)
                            .string_len(14)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Empresas::EmailEmpresa).string().not_null())
                    .col(
                        ColumnDef::new(Empresas::StatusEmpresa)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Empresas::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(Empresas::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Empresas::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Empresas {
    Table,
    Id,
    NomeEmpresa,
    CnpjEmpresa,
    EmailEmpresa,
    StatusEmpresa,
    CreatedAt,
    UpdatedAt,
}
