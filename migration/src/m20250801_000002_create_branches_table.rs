use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 支店テーブルの作成
        manager
            .create_table(
                Table::create()
                    .table(Filiais::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Filiais::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Filiais::IdEmpresa).uuid().not_null())
                    .col(ColumnDef::new(Filiais::NomeFilial).string().not_null())
                    .col(ColumnDef::new(Filiais::EnderecoFilial).string().null())
                    .col(
                        ColumnDef::new(Filiais::StatusFilial)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Filiais::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(Filiais::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_filiais_id_empresa")
                            .from(Filiais::Table, Filiais::IdEmpresa)
                            .to(Empresas::Table, Empresas::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_filiais_id_empresa")
                    .table(Filiais::Table)
                    .col(Filiais::IdEmpresa)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Filiais::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Filiais {
    Table,
    Id,
    IdEmpresa,
    NomeFilial,
    EnderecoFilial,
    StatusFilial,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Empresas {
    Table,
    Id,
}
