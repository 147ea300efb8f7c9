use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 権限プロファイルテーブルの作成
        manager
            .create_table(
                Table::create()
                    .table(Perfis::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Perfis::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Perfis::IdEmpresa).uuid().not_null())
                    .col(ColumnDef::new(Perfis::IdFilial).uuid().not_null())
                    .col(ColumnDef::new(Perfis::NomePerfil).string().not_null())
                    .col(ColumnDef::new(Perfis::Permissoes).json_binary().not_null())
                    .col(
                        ColumnDef::new(Perfis::StatusPerfil)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Perfis::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(Perfis::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_perfis_id_empresa")
                            .from(Perfis::Table, Perfis::IdEmpresa)
                            .to(Empresas::Table, Empresas::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_perfis_id_filial")
                            .from(Perfis::Table, Perfis::IdFilial)
                            .to(Filiais::Table, Filiais::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_perfis_id_filial")
                    .table(Perfis::Table)
                    .col(Perfis::IdFilial)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Perfis::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Perfis {
    Table,
    Id,
    IdEmpresa,
    IdFilial,
    NomePerfil,
    Permissoes,
    StatusPerfil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Empresas {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Filiais {
    Table,
    Id,
}
