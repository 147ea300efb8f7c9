// gym-backend/src/service/tenant_service.rs

use crate::api::dto::tenant_dto::{
    BranchResponse, CompanyResponse, CreateBranchRequest, CreateCompanyRequest,
    CreateProfileRequest, CreateUserRequest, ProfileResponse, StatusChangeRequest, UserResponse,
};
use crate::domain::actor::ActorContext;
use crate::domain::audit_log_model::AuditAction;
use crate::domain::permission::PermissionSet;
use crate::domain::{branch_model, company_model, profile_model, user_model};
use crate::error::{AppError, AppResult};
use crate::repository::branch_repository::BranchRepository;
use crate::repository::company_repository::CompanyRepository;
use crate::repository::profile_repository::ProfileRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::audit_log_service::AuditLogService;
use crate::utils::error_helper::{convert_validation_errors, internal_server_error, not_found_error};
use crate::utils::password::{PasswordError, PasswordManager};
use crate::utils::validation::clean_cnpj;
use sea_orm::{ActiveModelBehavior, Set};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

fn status_verb(status: bool) -> &'static str {
    if status {
        "Ativou"
    } else {
        "Desativou"
    }
}

/// 会社・支店・プロファイル・利用者の登録（管理者のみ）
pub struct TenantService {
    company_repo: Arc<CompanyRepository>,
    branch_repo: Arc<BranchRepository>,
    profile_repo: Arc<ProfileRepository>,
    user_repo: Arc<UserRepository>,
    password_manager: Arc<PasswordManager>,
    audit_log_service: Arc<AuditLogService>,
}

impl TenantService {
    pub fn new(
        company_repo: Arc<CompanyRepository>,
        branch_repo: Arc<BranchRepository>,
        profile_repo: Arc<ProfileRepository>,
        user_repo: Arc<UserRepository>,
        password_manager: Arc<PasswordManager>,
        audit_log_service: Arc<AuditLogService>,
    ) -> Self {
        Self {
            company_repo,
            branch_repo,
            profile_repo,
            user_repo,
            password_manager,
            audit_log_service,
        }
    }

    // --- 会社 ---

    pub async fn create_company(
        &self,
        request: CreateCompanyRequest,
        actor: &ActorContext,
    ) -> AppResult<CompanyResponse> {
        actor.ensure_admin()?;
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "tenant_service::create_company"))?;

        let cnpj = clean_cnpj(&request.cnpj_empresa)
            .ok_or_else(|| AppError::ValidationError("cnpj_empresa: CNPJ inválido".to_string()))?;

        if self.company_repo.find_by_cnpj(&cnpj).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "cnpj_empresa: CNPJ {} já cadastrado",
                cnpj
            )));
        }

        let mut active = company_model::ActiveModel::new();
        active.nome_empresa = Set(request.nome_empresa.trim().to_string());
        active.cnpj_empresa = Set(cnpj);
        active.email_empresa = Set(request.email_empresa.trim().to_lowercase());

        let company = self.company_repo.create(active).await?;
        info!(id_empresa = %company.id, "Company created");

        self.audit_log_service
            .record_for_company(
                actor,
                company.id,
                AuditAction::CompanyCreated,
                format!(
                    "Cadastrou a empresa {} (CNPJ {})",
                    company.nome_empresa, company.cnpj_empresa
                ),
            )
            .await;

        Ok(company.into())
    }

    pub async fn set_company_status(
        &self,
        request: StatusChangeRequest,
        actor: &ActorContext,
    ) -> AppResult<CompanyResponse> {
        actor.ensure_admin()?;

        let company = self.company_repo.set_status(request.id, request.status).await?;

        self.audit_log_service
            .record_for_company(
                actor,
                company.id,
                AuditAction::CompanyStatusChanged,
                format!(
                    "{} a empresa {}",
                    status_verb(company.status_empresa),
                    company.nome_empresa
                ),
            )
            .await;

        Ok(company.into())
    }

    // --- 支店 ---

    pub async fn create_branch(
        &self,
        request: CreateBranchRequest,
        actor: &ActorContext,
    ) -> AppResult<BranchResponse> {
        actor.ensure_admin()?;
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "tenant_service::create_branch"))?;

        let company = self
            .company_repo
            .find_by_id(request.id_empresa)
            .await?
            .ok_or_else(|| {
                not_found_error("Empresa", &request.id_empresa.to_string(), "create_branch")
            })?;

        let mut active = branch_model::ActiveModel::new();
        active.id_empresa = Set(company.id);
        active.nome_filial = Set(request.nome_filial.trim().to_string());
        active.endereco_filial = Set(request
            .endereco_filial
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()));

        let branch = self.branch_repo.create(active).await?;
        info!(id_filial = %branch.id, id_empresa = %company.id, "Branch created");

        self.audit_log_service
            .record_for_company(
                actor,
                company.id,
                AuditAction::BranchCreated,
                format!(
                    "Cadastrou a filial {} na empresa {}",
                    branch.nome_filial, company.nome_empresa
                ),
            )
            .await;

        Ok(branch.into())
    }

    pub async fn set_branch_status(
        &self,
        request: StatusChangeRequest,
        actor: &ActorContext,
    ) -> AppResult<BranchResponse> {
        actor.ensure_admin()?;

        let branch = self.branch_repo.set_status(request.id, request.status).await?;

        self.audit_log_service
            .record_for_company(
                actor,
                branch.id_empresa,
                AuditAction::BranchStatusChanged,
                format!(
                    "{} a filial {}",
                    status_verb(branch.status_filial),
                    branch.nome_filial
                ),
            )
            .await;

        Ok(branch.into())
    }

    // --- プロファイル ---

    pub async fn create_profile(
        &self,
        request: CreateProfileRequest,
        actor: &ActorContext,
    ) -> AppResult<ProfileResponse> {
        actor.ensure_admin()?;
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "tenant_service::create_profile"))?;

        let permissoes = PermissionSet::from_json(&request.permissoes)
            .map_err(|e| AppError::ValidationError(format!("permissoes: {}", e)))?;

        let branch = self
            .branch_repo
            .find_for_company(request.id_filial, request.id_empresa)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(
                    "id_filial: Filial não pertence à empresa informada".to_string(),
                )
            })?;

        let mut active = profile_model::ActiveModel::new();
        active.id_empresa = Set(branch.id_empresa);
        active.id_filial = Set(branch.id);
        active.nome_perfil = Set(request.nome_perfil.trim().to_string());
        active.permissoes = Set(permissoes.to_json());

        let profile = self.profile_repo.create(active).await?;
        info!(id_perfil = %profile.id, admin = permissoes.admin, "Profile created");

        self.audit_log_service
            .record_for_company(
                actor,
                branch.id_empresa,
                AuditAction::ProfileCreated,
                format!(
                    "Cadastrou o perfil {} na filial {}",
                    profile.nome_perfil, branch.nome_filial
                ),
            )
            .await;

        Ok(ProfileResponse::new(profile, permissoes))
    }

    pub async fn set_profile_status(
        &self,
        request: StatusChangeRequest,
        actor: &ActorContext,
    ) -> AppResult<ProfileResponse> {
        actor.ensure_admin()?;

        let profile = self.profile_repo.set_status(request.id, request.status).await?;
        // 保存済みの値は作成時に検証済み
        let permissoes = profile.permission_set().unwrap_or_default();

        self.audit_log_service
            .record_for_company(
                actor,
                profile.id_empresa,
                AuditAction::ProfileStatusChanged,
                format!(
                    "{} o perfil {}",
                    status_verb(profile.status_perfil),
                    profile.nome_perfil
                ),
            )
            .await;

        Ok(ProfileResponse::new(profile, permissoes))
    }

    // --- 利用者 ---

    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        actor: &ActorContext,
    ) -> AppResult<UserResponse> {
        actor.ensure_admin()?;
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "tenant_service::create_user"))?;

        let branch = self
            .branch_repo
            .find_for_company(request.id_filial, request.id_empresa)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(
                    "id_filial: Filial não pertence à empresa informada".to_string(),
                )
            })?;

        let profile = self
            .profile_repo
            .find_for_company(request.id_perfil, request.id_empresa)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(
                    "id_perfil: Perfil não pertence à empresa informada".to_string(),
                )
            })?;

        let email = request.email_usuario.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "email_usuario: Email {} já cadastrado",
                email
            )));
        }

        let senha_hash = self
            .password_manager
            .hash_password(&request.senha)
            .map_err(|e| match e {
                PasswordError::WeakPassword(message) => {
                    AppError::ValidationError(format!("senha: {}", message))
                }
                other => internal_server_error(
                    other,
                    "tenant_service::create_user",
                    "Erro ao processar a senha",
                ),
            })?;

        let mut active = user_model::ActiveModel::new();
        active.id_empresa = Set(branch.id_empresa);
        active.id_filial = Set(branch.id);
        active.id_perfil = Set(profile.id);
        active.nome_usuario = Set(request.nome_usuario.trim().to_string());
        active.email_usuario = Set(email);
        active.senha_hash = Set(senha_hash);

        let user = self.user_repo.create(active).await?;
        info!(id_usuario = %user.id, id_filial = %branch.id, "User created");

        self.audit_log_service
            .record_for_company(
                actor,
                branch.id_empresa,
                AuditAction::UserCreated,
                format!(
                    "Cadastrou o usuário {} ({}) com perfil {}",
                    user.nome_usuario, user.email_usuario, profile.nome_perfil
                ),
            )
            .await;

        Ok(user.into())
    }

    pub async fn set_user_status(
        &self,
        request: StatusChangeRequest,
        actor: &ActorContext,
    ) -> AppResult<UserResponse> {
        actor.ensure_admin()?;

        if request.id == actor.id_usuario && !request.status {
            return Err(AppError::ValidationError(
                "Não é possível desativar o próprio usuário".to_string(),
            ));
        }

        let user = self.user_repo.set_status(request.id, request.status).await?;

        self.audit_log_service
            .record_for_company(
                actor,
                user.id_empresa,
                AuditAction::UserStatusChanged,
                format!(
                    "{} o usuário {}",
                    status_verb(user.status_usuario),
                    user.nome_usuario
                ),
            )
            .await;

        Ok(user.into())
    }
}
