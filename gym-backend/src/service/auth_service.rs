// gym-backend/src/service/auth_service.rs

use crate::api::dto::auth_dto::{AuthenticatedUser, LoginRequest, LoginResponse};
use crate::domain::actor::ActorContext;
use crate::error::{AppError, AppResult};
use crate::repository::branch_repository::BranchRepository;
use crate::repository::company_repository::CompanyRepository;
use crate::repository::profile_repository::ProfileRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::error_helper::{convert_validation_errors, internal_server_error};
use crate::utils::jwt::JwtManager;
use crate::utils::password::PasswordManager;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Email ou senha inválidos";

/// 認証サービス
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    profile_repo: Arc<ProfileRepository>,
    branch_repo: Arc<BranchRepository>,
    company_repo: Arc<CompanyRepository>,
    password_manager: Arc<PasswordManager>,
    jwt_manager: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        profile_repo: Arc<ProfileRepository>,
        branch_repo: Arc<BranchRepository>,
        company_repo: Arc<CompanyRepository>,
        password_manager: Arc<PasswordManager>,
        jwt_manager: Arc<JwtManager>,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            branch_repo,
            company_repo,
            password_manager,
            jwt_manager,
        }
    }

    /// ログイン（利用者・プロファイル・支店・会社がすべて有効であること）
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "auth_service::login"))?;

        let Some(user) = self.user_repo.find_by_email(&request.email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let password_ok = self
            .password_manager
            .verify_password(&request.senha, &user.senha_hash)
            .map_err(|e| internal_server_error(e, "auth_service::login", "Erro ao autenticar"))?;

        if !password_ok {
            warn!(id_usuario = %user.id, "Login attempt with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.status_usuario {
            return Err(AppError::Unauthorized("Usuário desativado".to_string()));
        }

        let profile = self
            .profile_repo
            .find_by_id(user.id_perfil)
            .await?
            .filter(|p| p.status_perfil)
            .ok_or_else(|| AppError::Unauthorized("Perfil do usuário desativado".to_string()))?;

        let branch_active = self
            .branch_repo
            .find_by_id(user.id_filial)
            .await?
            .is_some_and(|b| b.status_filial);
        if !branch_active {
            return Err(AppError::Unauthorized("Filial desativada".to_string()));
        }

        let company_active = self
            .company_repo
            .find_by_id(user.id_empresa)
            .await?
            .is_some_and(|c| c.status_empresa);
        if !company_active {
            return Err(AppError::Unauthorized("Empresa desativada".to_string()));
        }

        let permissoes = profile.permission_set().map_err(|e| {
            internal_server_error(e, "auth_service::login", "Permissões do perfil inválidas")
        })?;

        let actor = ActorContext {
            id_usuario: user.id,
            id_empresa: user.id_empresa,
            id_filial: user.id_filial,
            id_perfil: user.id_perfil,
            nome_usuario: user.nome_usuario.clone(),
            permissoes,
        };

        let access_token = self
            .jwt_manager
            .generate_access_token(&actor)
            .map_err(|e| internal_server_error(e, "auth_service::login", "Erro ao gerar token"))?;

        info!(id_usuario = %user.id, id_filial = %user.id_filial, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_manager.expires_in_seconds(),
            usuario: AuthenticatedUser {
                id_usuario: actor.id_usuario,
                id_empresa: actor.id_empresa,
                id_filial: actor.id_filial,
                id_perfil: actor.id_perfil,
                nome_usuario: actor.nome_usuario,
                email_usuario: user.email_usuario,
                permissoes: actor.permissoes,
            },
        })
    }
}
