// tests/common/app_helper.rs

use axum::Router;
use gym_backend::{
    api::{create_app_router, AppState},
    config::AppConfig,
    domain::{
        actor::ActorContext, branch_model, company_model, permission::PermissionSet,
        profile_model, user_model,
    },
    utils::{
        jwt::JwtManager,
        password::{Argon2Config, PasswordManager},
    },
};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::common;
use crate::common::mock_gateway::MockPaymentGateway;

pub const TEST_PASSWORD: &str = "SenhaForte123";

/// テスト用のテナント（会社・支店・プロファイル・利用者）
#[derive(Debug, Clone)]
pub struct TestTenant {
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub id_perfil: Uuid,
    pub id_usuario: Uuid,
    pub email: String,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<MockPaymentGateway>,
    pub jwt_manager: Arc<JwtManager>,
    pub password_manager: Arc<PasswordManager>,
    pub db: common::db::TestDatabase,
}

/// テスト用の軽い argon2 設定
fn test_password_manager() -> Arc<PasswordManager> {
    Arc::new(
        PasswordManager::new(Argon2Config {
            memory_cost: 8192,
            time_cost: 1,
            parallelism: 1,
        })
        .unwrap(),
    )
}

/// 全ルート付きのアプリを起動する
pub async fn setup_app() -> TestApp {
    common::init_test_env();

    let db = common::db::TestDatabase::new().await;
    let app_config = AppConfig::for_testing();
    let gateway = Arc::new(MockPaymentGateway::new());
    let password_manager = test_password_manager();

    let app_state = AppState::new(
        db.connection.clone(),
        &app_config,
        gateway.clone(),
        password_manager.clone(),
    )
    .unwrap();
    let jwt_manager = app_state.jwt_manager.clone();

    TestApp {
        router: create_app_router(app_state),
        gateway,
        jwt_manager,
        password_manager,
        db,
    }
}

impl TestApp {
    pub fn conn(&self) -> &DatabaseConnection {
        &self.db.connection
    }

    /// 会社・支店・プロファイル・利用者を作成してトークンを発行する
    pub async fn seed_tenant(&self, nome: &str, permissoes: PermissionSet) -> TestTenant {
        let mut company = company_model::ActiveModel::new();
        company.nome_empresa = Set(nome.to_string());
        company.cnpj_empresa = Set(format!("{:014}", Uuid::new_v4().as_u128() % 10u128.pow(14)));
        company.email_empresa = Set(common::test_data::unique_email("empresa"));
        let company = company.insert(self.conn()).await.unwrap();

        let mut branch = branch_model::ActiveModel::new();
        branch.id_empresa = Set(company.id);
        branch.nome_filial = Set(format!("{} - Matriz", nome));
        branch.endereco_filial = Set(None);
        let branch = branch.insert(self.conn()).await.unwrap();

        self.seed_user_in(company.id, branch.id, permissoes).await
    }

    /// 既存の支店に別の利用者を作成する
    pub async fn seed_user_in(
        &self,
        id_empresa: Uuid,
        id_filial: Uuid,
        permissoes: PermissionSet,
    ) -> TestTenant {
        let mut profile = profile_model::ActiveModel::new();
        profile.id_empresa = Set(id_empresa);
        profile.id_filial = Set(id_filial);
        profile.nome_perfil = Set(format!("Perfil {}", &Uuid::new_v4().simple().to_string()[..6]));
        profile.permissoes = Set(permissoes.to_json());
        let profile = profile.insert(self.conn()).await.unwrap();

        let email = common::test_data::unique_email("usuario");
        let mut user = user_model::ActiveModel::new();
        user.id_empresa = Set(id_empresa);
        user.id_filial = Set(id_filial);
        user.id_perfil = Set(profile.id);
        user.nome_usuario = Set("Recepção".to_string());
        user.email_usuario = Set(email.clone());
        user.senha_hash = Set(self.password_manager.hash_password(TEST_PASSWORD).unwrap());
        let user = user.insert(self.conn()).await.unwrap();

        let token = self
            .jwt_manager
            .generate_access_token(&ActorContext {
                id_usuario: user.id,
                id_empresa,
                id_filial,
                id_perfil: profile.id,
                nome_usuario: user.nome_usuario.clone(),
                permissoes,
            })
            .unwrap();

        TestTenant {
            id_empresa,
            id_filial,
            id_perfil: profile.id,
            id_usuario: user.id,
            email,
            token,
        }
    }
}
