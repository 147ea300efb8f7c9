// gym-backend/src/service/student_service.rs

use crate::api::dto::student_dto::{
    EditStudentRequest, EditStudentResponse, StudentListQuery, StudentResponse,
    StudentStatusRequest,
};
use crate::domain::actor::ActorContext;
use crate::domain::audit_log_model::AuditAction;
use crate::domain::permission::{PermissionAction, PermissionModule};
use crate::domain::student_model::{ActiveModel as StudentActiveModel, Model as StudentModel};
use crate::error::{AppError, AppResult};
use crate::repository::student_repository::{
    classify_unique_violation, StudentFilter, StudentRepository,
};
use crate::service::audit_log_service::AuditLogService;
use crate::service::matricula_allocator::duplicate_error;
use crate::service::student_checks::{
    check_cpf, check_email, check_name, check_phone, check_plan, ensure_unique, ValueParsing,
};
use crate::utils::error_helper::not_found_error;
use sea_orm::{IntoActiveModel, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct StudentService {
    student_repo: Arc<StudentRepository>,
    audit_log_service: Arc<AuditLogService>,
}

/// 編集で変わる値
#[derive(Debug, Default)]
struct StudentChanges {
    nome: Option<String>,
    email: Option<String>,
    telefone: Option<String>,
    cpf: Option<String>,
    plano: Option<String>,
    descricoes: Vec<String>,
}

impl StudentChanges {
    fn is_empty(&self) -> bool {
        self.descricoes.is_empty()
    }

    fn track(field: &str, current: &str, new: String, descricoes: &mut Vec<String>) -> Option<String> {
        if current == new {
            None
        } else {
            descricoes.push(format!("{}: '{}' -> '{}'", field, current, new));
            Some(new)
        }
    }
}

impl StudentService {
    pub fn new(student_repo: Arc<StudentRepository>, audit_log_service: Arc<AuditLogService>) -> Self {
        Self {
            student_repo,
            audit_log_service,
        }
    }

    /// 操作者の支店の生徒一覧
    pub async fn list(
        &self,
        actor: &ActorContext,
        query: StudentListQuery,
    ) -> AppResult<Vec<StudentResponse>> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Visualizar)?;

        let filter = StudentFilter {
            status: query.status,
            busca: query.busca,
        };
        let students = self
            .student_repo
            .list_for_branch(actor.id_filial, &filter)
            .await?;

        Ok(students.into_iter().map(StudentResponse::from).collect())
    }

    async fn find_owned(&self, id_aluno: Uuid, actor: &ActorContext) -> AppResult<StudentModel> {
        self.student_repo
            .find_for_company(id_aluno, actor.id_empresa)
            .await?
            .ok_or_else(|| not_found_error("Aluno", &id_aluno.to_string(), "student_service"))
    }

    pub async fn edit(
        &self,
        request: EditStudentRequest,
        actor: &ActorContext,
    ) -> AppResult<EditStudentResponse> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Editar)?;

        let current = self.find_owned(request.id_aluno, actor).await?;
        let changes = Self::diff(&current, &request)?;

        if changes.is_empty() {
            return Ok(EditStudentResponse {
                aluno: current.into(),
                alteracoes: Vec::new(),
            });
        }

        ensure_unique(
            &self.student_repo,
            actor.id_empresa,
            changes.cpf.as_deref(),
            changes.email.as_deref(),
            Some(current.id),
        )
        .await?;

        let nome_anterior = current.nome_aluno.clone();
        let matricula = current.matricula_aluno.clone();

        let mut active: StudentActiveModel = current.into_active_model();
        if let Some(nome) = changes.nome {
            active.nome_aluno = Set(nome);
        }
        if let Some(email) = changes.email {
            active.email_aluno = Set(email);
        }
        if let Some(telefone) = changes.telefone {
            active.telefone_aluno = Set(telefone);
        }
        if let Some(cpf) = changes.cpf {
            active.cpf_aluno = Set(cpf);
        }
        if let Some(plano) = changes.plano {
            active.plano_aluno = Set(plano);
        }

        // 重複チェック後の競合は制約違反として届く
        let updated = self.student_repo.update(active).await.map_err(|e| {
            match classify_unique_violation(&e) {
                Some(constraint) => duplicate_error(constraint),
                None => AppError::DbErr(e),
            }
        })?;

        self.audit_log_service
            .record(
                actor,
                AuditAction::StudentEdited,
                format!(
                    "Editou o aluno {} (matrícula {}): {}",
                    nome_anterior,
                    matricula,
                    changes.descricoes.join(", ")
                ),
            )
            .await;

        info!(id_aluno = %updated.id, fields = changes.descricoes.len(), "Student edited");

        Ok(EditStudentResponse {
            aluno: updated.into(),
            alteracoes: changes.descricoes,
        })
    }

    /// 入力された項目だけを検証し、現在値との差分を作る
    fn diff(current: &StudentModel, request: &EditStudentRequest) -> AppResult<StudentChanges> {
        let mut changes = StudentChanges::default();
        let mut errors = Vec::new();

        let provided = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        if let Some(raw) = provided(&request.nome_aluno) {
            match check_name(&raw) {
                Ok(nome) => {
                    changes.nome =
                        StudentChanges::track("nome_aluno", &current.nome_aluno, nome, &mut changes.descricoes)
                }
                Err(e) => errors.push(e),
            }
        }
        if let Some(raw) = provided(&request.email_aluno) {
            match check_email(&raw) {
                Ok(email) => {
                    changes.email = StudentChanges::track(
                        "email_aluno",
                        &current.email_aluno,
                        email,
                        &mut changes.descricoes,
                    )
                }
                Err(e) => errors.push(e),
            }
        }
        if let Some(raw) = provided(&request.telefone_aluno) {
            match check_phone(&raw) {
                Ok(telefone) => {
                    changes.telefone = StudentChanges::track(
                        "telefone_aluno",
                        &current.telefone_aluno,
                        telefone,
                        &mut changes.descricoes,
                    )
                }
                Err(e) => errors.push(e),
            }
        }
        if let Some(raw) = provided(&request.cpf_aluno) {
            match check_cpf(&raw) {
                Ok(cpf) => {
                    changes.cpf =
                        StudentChanges::track("cpf_aluno", &current.cpf_aluno, cpf, &mut changes.descricoes)
                }
                Err(e) => errors.push(e),
            }
        }
        if let Some(raw) = provided(&request.plano_aluno) {
            match check_plan(&raw, ValueParsing::Strict) {
                Ok(plano) => {
                    changes.plano = StudentChanges::track(
                        "plano_aluno",
                        &current.plano_aluno,
                        plano.as_str().to_string(),
                        &mut changes.descricoes,
                    )
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }

    pub async fn set_status(
        &self,
        request: StudentStatusRequest,
        actor: &ActorContext,
    ) -> AppResult<StudentResponse> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Editar)?;

        let current = self.find_owned(request.id_aluno, actor).await?;
        if current.status_aluno == request.status_aluno {
            return Ok(current.into());
        }

        let mut active: StudentActiveModel = current.into_active_model();
        active.status_aluno = Set(request.status_aluno);
        let updated = self.student_repo.update(active).await?;

        let verbo = if updated.status_aluno { "Ativou" } else { "Desativou" };
        self.audit_log_service
            .record(
                actor,
                AuditAction::StudentStatusChanged,
                format!(
                    "{} o aluno {} (matrícula {})",
                    verbo, updated.nome_aluno, updated.matricula_aluno
                ),
            )
            .await;

        Ok(updated.into())
    }
}
