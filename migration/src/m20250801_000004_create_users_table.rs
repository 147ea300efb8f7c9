use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 利用者テーブルの作成
        manager
            .create_table(
                Table::create()
                    .table(Usuarios::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Usuarios::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Usuarios::IdEmpresa).uuid().not_null())
                    .col(ColumnDef::new(Usuarios::IdFilial).uuid().not_null())
                    .col(ColumnDef::new(Usuarios::IdPerfil).uuid().not_null())
                    .col(ColumnDef::new(Usuarios::NomeUsuario).string().not_null())
                    .col(
                        ColumnDef::new(Usuarios::EmailUsuario)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Usuarios::SenhaHash).string().not_null())
                    .col(
                        ColumnDef::new(Usuarios::StatusUsuario)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Usuarios::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(Usuarios::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_id_empresa")
                            .from(Usuarios::Table, Usuarios::IdEmpresa)
                            .to(Empresas::Table, Empresas::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_id_filial")
                            .from(Usuarios::Table, Usuarios::IdFilial)
                            .to(Filiais::Table, Filiais::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_id_perfil")
                            .from(Usuarios::Table, Usuarios::IdPerfil)
                            .to(Perfis::Table, Perfis::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usuarios::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Usuarios {
    Table,
    Id,
    IdEmpresa,
    IdFilial,
    IdPerfil,
    NomeUsuario,
    EmailUsuario,
    SenhaHash,
    StatusUsuario,
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

#[derive(DeriveIden)]
enum Perfis {
    Table,
    Id,
}
