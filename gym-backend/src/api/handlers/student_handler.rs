// gym-backend/src/api/handlers/student_handler.rs

use crate::api::dto::student_dto::{
    EditStudentRequest, EditStudentResponse, StudentListQuery, StudentResponse,
    StudentStatusRequest,
};
use crate::api::AppState;
use crate::domain::actor::ActorContext;
use crate::error::{AppError, AppResult};
use crate::extractors::AppJson;
use crate::types::ApiResponse;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, put},
    Router,
};

/// 支店の生徒一覧
pub async fn list_students_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    query: Result<Query<StudentListQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Vec<StudentResponse>>> {
    let Query(query) = query.map_err(|e| {
        AppError::ValidationError(format!("Parâmetros inválidos: {}", e.body_text()))
    })?;

    let students = app_state.student_service.list(&actor, query).await?;
    let total = students.len() as u64;

    Ok(ApiResponse::success("Alunos listados com sucesso", students).with_total(total))
}

/// 生徒情報の編集
pub async fn edit_student_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<EditStudentRequest>,
) -> AppResult<ApiResponse<EditStudentResponse>> {
    let response = app_state.student_service.edit(payload, &actor).await?;

    let message = if response.alteracoes.is_empty() {
        "Nenhuma alteração realizada"
    } else {
        "Aluno atualizado com sucesso"
    };

    Ok(ApiResponse::success(message, response))
}

/// 生徒の有効・無効切り替え
pub async fn set_student_status_handler(
    State(app_state): State<AppState>,
    actor: ActorContext,
    AppJson(payload): AppJson<StudentStatusRequest>,
) -> AppResult<ApiResponse<StudentResponse>> {
    let student = app_state.student_service.set_status(payload, &actor).await?;

    let message = if student.status_aluno {
        "Aluno ativado com sucesso"
    } else {
        "Aluno desativado com sucesso"
    };

    Ok(ApiResponse::success(message, student))
}

pub fn student_router(app_state: AppState) -> Router {
    Router::new()
        .route("/alunos", get(list_students_handler))
        .route("/alunos/editar-alunos", put(edit_student_handler))
        .route("/alunos/alterar-status", put(set_student_status_handler))
        .with_state(app_state)
}
