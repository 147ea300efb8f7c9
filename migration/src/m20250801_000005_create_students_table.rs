use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 生徒テーブルの作成
        manager
            .create_table(
                Table::create()
                    .table(Alunos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Alunos::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Alunos::IdEmpresa).uuid().not_null())
                    .col(ColumnDef::new(Alunos::IdFilial).uuid().not_null())
                    .col(ColumnDef::new(Alunos::NomeAluno).string().not_null())
                    .col(ColumnDef::new(Alunos::EmailAluno).string().not_null())
                    .col(ColumnDef::new(Alunos::TelefoneAluno).string_len(11).not_null())
                    .col(ColumnDef::new(Alunos::CpfAluno).string_len(11).not_null())
                    .col(ColumnDef::new(Alunos::PlanoAluno).string().not_null())
                    .col(ColumnDef::new(Alunos::FormaPagamento).string().not_null())
                    .col(ColumnDef::new(Alunos::Situacao).string().not_null())
                    .col(
                        ColumnDef::new(Alunos::StatusAluno)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Alunos::MatriculaAluno).string_len(5).not_null())
                    .col(ColumnDef::new(Alunos::IdPagamento).string().null())
                    .col(ColumnDef::new(Alunos::IdCliente).string().null())
                    .col(
                        ColumnDef::new(Alunos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .col(
                        ColumnDef::new(Alunos::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alunos_id_empresa")
                            .from(Alunos::Table, Alunos::IdEmpresa)
                            .to(Empresas::Table, Empresas::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alunos_id_filial")
                            .from(Alunos::Table, Alunos::IdFilial)
                            .to(Filiais::Table, Filiais::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // マトリキュラ番号は支店内で一意
        manager
            .create_index(
                Index::create()
                    .name("idx_alunos_filial_matricula")
                    .table(Alunos::Table)
                    .col(Alunos::IdFilial)
                    .col(Alunos::MatriculaAluno)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // CPFは会社内で一意
        manager
            .create_index(
                Index::create()
                    .name("idx_alunos_empresa_cpf")
                    .table(Alunos::Table)
                    .col(Alunos::IdEmpresa)
                    .col(Alunos::CpfAluno)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // メールアドレスは大文字小文字を区別せず会社内で一意
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_alunos_empresa_email \
                 ON alunos (id_empresa, LOWER(email_aluno))",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alunos_filial_nome")
                    .table(Alunos::Table)
                    .col(Alunos::IdFilial)
                    .col(Alunos::NomeAluno)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alunos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Alunos {
    Table,
    Id,
    IdEmpresa,
    IdFilial,
    NomeAluno,
    EmailAluno,
    TelefoneAluno,
    CpfAluno,
    PlanoAluno,
    FormaPagamento,
    Situacao,
    StatusAluno,
    MatriculaAluno,
    IdPagamento,
    IdCliente,
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
