use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INITIAL_CNPJ: &str = "00000000000000";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ハッシュが未設定の環境では初期管理者を作成しない
        // ハッシュは `generate-password-hash` バイナリで生成する
        let Ok(admin_password_hash) = std::env::var("INITIAL_ADMIN_PASSWORD_HASH") else {
            return Ok(());
        };
        let admin_email = std::env::var("INITIAL_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@example.com".to_string())
            .to_lowercase();

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Empresas::Table)
                    .columns([
                        Empresas::Id,
                        Empresas::NomeEmpresa,
                        Empresas::CnpjEmpresa,
                        Empresas::EmailEmpresa,
                    ])
                    .values_panic([
                        Expr::cust("gen_random_uuid()"),
                        "Empresa Principal".into(),
                        INITIAL_CNPJ.into(),
                        admin_email.clone().into(),
                    ])
                    .to_owned(),
            )
            .await?;

        let empresa_id = format!(
            "(SELECT id FROM empresas WHERE cnpj_empresa = '{}')",
            INITIAL_CNPJ
        );

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Filiais::Table)
                    .columns([Filiais::Id, Filiais::IdEmpresa, Filiais::NomeFilial])
                    .values_panic([
                        Expr::cust("gen_random_uuid()"),
                        Expr::cust(&empresa_id),
                        "Matriz".into(),
                    ])
                    .to_owned(),
            )
            .await?;

        let filial_id = format!(
            "(SELECT id FROM filiais WHERE id_empresa = {} AND nome_filial = 'Matriz')",
            empresa_id
        );

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Perfis::Table)
                    .columns([
                        Perfis::Id,
                        Perfis::IdEmpresa,
                        Perfis::IdFilial,
                        Perfis::NomePerfil,
                        Perfis::Permissoes,
                    ])
                    .values_panic([
                        Expr::cust("gen_random_uuid()"),
                        Expr::cust(&empresa_id),
                        Expr::cust(&filial_id),
                        "Administrador".into(),
                        Expr::cust(r#"'{"admin": true}'::jsonb"#),
                    ])
                    .to_owned(),
            )
            .await?;

        let perfil_id = format!(
            "(SELECT id FROM perfis WHERE id_empresa = {} AND nome_perfil = 'Administrador')",
            empresa_id
        );

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Usuarios::Table)
                    .columns([
                        Usuarios::Id,
                        Usuarios::IdEmpresa,
                        Usuarios::IdFilial,
                        Usuarios::IdPerfil,
                        Usuarios::NomeUsuario,
                        Usuarios::EmailUsuario,
                        Usuarios::SenhaHash,
                    ])
                    .values_panic([
                        Expr::cust("gen_random_uuid()"),
                        Expr::cust(&empresa_id),
                        Expr::cust(&filial_id),
                        Expr::cust(&perfil_id),
                        "Administrador".into(),
                        admin_email.into(),
                        admin_password_hash.into(),
                    ])
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 初期会社に紐づくデータを逆順で削除
        let empresa_id = format!(
            "(SELECT id FROM empresas WHERE cnpj_empresa = '{}')",
            INITIAL_CNPJ
        );

        for table in ["usuarios", "perfis", "filiais"] {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "DELETE FROM {} WHERE id_empresa = {}",
                    table, empresa_id
                ))
                .await?;
        }

        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Empresas::Table)
                    .and_where(Expr::col(Empresas::CnpjEmpresa).eq(INITIAL_CNPJ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Empresas {
    Table,
    Id,
    NomeEmpresa,
    CnpjEmpresa,
    EmailEmpresa,
}

#[derive(Iden)]
enum Filiais {
    Table,
    Id,
    IdEmpresa,
    NomeFilial,
}

#[derive(Iden)]
enum Perfis {
    Table,
    Id,
    IdEmpresa,
    IdFilial,
    NomePerfil,
    Permissoes,
}

#[derive(Iden)]
enum Usuarios {
    Table,
    Id,
    IdEmpresa,
    IdFilial,
    IdPerfil,
    NomeUsuario,
    EmailUsuario,
    SenhaHash,
}
