// gym-backend/src/api/handlers/admin_handler.rs

use crate::api::dto::tenant_dto::{
    BranchResponse, CompanyResponse, CreateBranchRequest, CreateCompanyRequest,
    CreateProfileRequest, CreateUserRequest, ProfileResponse, StatusChangeRequest, UserResponse,
};
use crate::api::AppState;
use crate::domain::actor::ActorContext;
use crate::error::AppResult;
use crate::extractors::AppJson;
use crate::types::ApiResponse;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};

type Created<T> = (StatusCode, Json<ApiResponse<T>>);

fn created<T>(message: &str, data: T) -> Created<T> {
    (StatusCode::CREATED, Json(ApiResponse::success(message, data)))
}

fn status_message(entity: &str, status: bool) -> String {
    if status {
        format!("{} ativado(a) com sucesso", entity)
    } else {
        format!("{} desativado(a) com sucesso", entity)
    }
}

// --- 会社 ---

pub async fn create_company_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<CreateCompanyRequest>,
) -> AppResult<Created<CompanyResponse>> {
    let company = app_state
        .tenant_service
        .create_company(payload, &actor)
        .await?;
    Ok(created("Empresa cadastrada com sucesso", company))
}

pub async fn set_company_status_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<StatusChangeRequest>,
) -> AppResult<ApiResponse<CompanyResponse>> {
    let company = app_state
        .tenant_service
        .set_company_status(payload, &actor)
        .await?;
    let message = status_message("Empresa", company.status_empresa);
    Ok(ApiResponse::success(message, company))
}

// --- 支店 ---

pub async fn create_branch_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<CreateBranchRequest>,
) -> AppResult<Created<BranchResponse>> {
    let branch = app_state
        .tenant_service
        .create_branch(payload, &actor)
        .await?;
    Ok(created("Filial cadastrada com sucesso", branch))
}

pub async fn set_branch_status_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<StatusChangeRequest>,
) -> AppResult<ApiResponse<BranchResponse>> {
    let branch = app_state
        .tenant_service
        .set_branch_status(payload, &actor)
        .await?;
    let message = status_message("Filial", branch.status_filial);
    Ok(ApiResponse::success(message, branch))
}

// --- プロファイル ---

pub async fn create_profile_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<CreateProfileRequest>,
) -> AppResult<Created<ProfileResponse>> {
    let profile = app_state
        .tenant_service
        .create_profile(payload, &actor)
        .await?;
    Ok(created("Perfil cadastrado com sucesso", profile))
}

pub async fn set_profile_status_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<StatusChangeRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = app_state
        .tenant_service
        .set_profile_status(payload, &actor)
        .await?;
    let message = status_message("Perfil", profile.status_perfil);
    Ok(ApiResponse::success(message, profile))
}

// --- 利用者 ---

pub async fn create_user_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = app_state.tenant_service.create_user(payload, &actor).await?;
    Ok(created("Usuário cadastrado com sucesso", user))
}

pub async fn set_user_status_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<StatusChangeRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = app_state
        .tenant_service
        .set_user_status(payload, &actor)
        .await?;
    let message = status_message("Usuário", user.status_usuario);
    Ok(ApiResponse::success(message, user))
}

pub fn admin_router(app_state: AppState) -> Router {
    Router::new()
        .route("/admin/empresas", post(create_company_handler))
        .route("/admin/empresas/alterar-status", put(set_company_status_handler))
        .route("/admin/filiais", post(create_branch_handler))
        .route("/admin/filiais/alterar-status", put(set_branch_status_handler))
        .route("/admin/perfis", post(create_profile_handler))
        .route("/admin/perfis/alterar-status", put(set_profile_status_handler))
        .route("/admin/usuarios", post(create_user_handler))
        .route("/admin/usuarios/alterar-status", put(set_user_status_handler))
        .with_state(app_state)
}
