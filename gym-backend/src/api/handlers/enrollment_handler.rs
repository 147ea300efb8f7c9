// gym-backend/src/api/handlers/enrollment_handler.rs

use crate::api::dto::import_dto::{ImportRequest, ImportSummary};
use crate::api::dto::student_dto::{
    ConfirmLinkRequest, ConfirmPixRequest, ConfirmationOutcome, EnrollRequest,
    EnrollmentResponse, PaymentLinkResponse, StudentPayload,
};
use crate::api::AppState;
use crate::domain::actor::ActorContext;
use crate::error::AppResult;
use crate::extractors::AppJson;
use crate::types::ApiResponse;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::info;

fn confirmation_response(outcome: ConfirmationOutcome) -> (StatusCode, Json<EnrollmentResponse>) {
    // 既に確定済みの支払いは 200 で同じ生徒を返す
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(outcome.response))
}

/// 入学（ボレート・PIX・カード）
pub async fn enroll_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<EnrollRequest>,
) -> AppResult<(StatusCode, Json<EnrollmentResponse>)> {
    let response = app_state.enrollment_service.enroll(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PIX の支払い確認
pub async fn confirm_pix_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<ConfirmPixRequest>,
) -> AppResult<(StatusCode, Json<EnrollmentResponse>)> {
    let outcome = app_state
        .enrollment_service
        .confirm_pix(payload, &actor)
        .await?;
    Ok(confirmation_response(outcome))
}

/// 支払いリンクの作成
pub async fn start_link_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<StudentPayload>,
) -> AppResult<(StatusCode, Json<PaymentLinkResponse>)> {
    let response = app_state
        .enrollment_service
        .start_link_enrollment(payload, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// 支払いリンクの入金確認
pub async fn confirm_link_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<ConfirmLinkRequest>,
) -> AppResult<(StatusCode, Json<EnrollmentResponse>)> {
    let outcome = app_state
        .enrollment_service
        .confirm_link(payload, &actor)
        .await?;
    Ok(confirmation_response(outcome))
}

/// 一括インポート
pub async fn import_students_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<ImportRequest>,
) -> AppResult<ApiResponse<ImportSummary>> {
    let summary = app_state
        .import_service
        .import_many(payload, &actor)
        .await?;

    info!(
        id_filial = %actor.id_filial,
        sucesso = summary.sucesso,
        erros = summary.erros,
        "Student import finished"
    );

    Ok(ApiResponse::success(summary.message(), summary))
}

pub fn enrollment_router(app_state: AppState) -> Router {
    Router::new()
        .route("/alunos/aluno-cadastrar", post(enroll_handler))
        .route("/alunos/confirmar-pagamento-pix", post(confirm_pix_handler))
        .route("/alunos/iniciar-cadastro-aluno", post(start_link_handler))
        .route("/alunos/confirmar-pagamento-link", post(confirm_link_handler))
        .route("/alunos/importar-alunos", post(import_students_handler))
        .with_state(app_state)
}
