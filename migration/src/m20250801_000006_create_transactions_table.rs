use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 決済トランザクションテーブルの作成
        manager
            .create_table(
                Table::create()
                    .table(Transacoes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transacoes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transacoes::IdAluno).uuid().not_null())
                    .col(ColumnDef::new(Transacoes::IdEmpresa).uuid().not_null())
                    .col(ColumnDef::new(Transacoes::IdFilial).uuid().not_null())
                    .col(
                        ColumnDef::new(Transacoes::ValorCentavos)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transacoes::FormaPagamento).string().not_null())
                    .col(
                        ColumnDef::new(Transacoes::Status)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Transacoes::IdPagamentoExterno)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Transacoes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transacoes_id_aluno")
                            .from(Transacoes::Table, Transacoes::IdAluno)
                            .to(Alunos::Table, Alunos::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transacoes_id_aluno")
                    .table(Transacoes::Table)
                    .col(Transacoes::IdAluno)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transacoes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Transacoes {
    Table,
    Id,
    IdAluno,
    IdEmpresa,
    IdFilial,
    ValorCentavos,
    FormaPagamento,
    Status,
    IdPagamentoExterno,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Alunos {
    Table,
    Id,
}
