// gym-backend/src/service/import_service.rs

use crate::api::dto::import_dto::{ImportRequest, ImportRow, ImportSummary};
use crate::api::dto::student_dto::StudentResponse;
use crate::domain::actor::ActorContext;
use crate::domain::audit_log_model::AuditAction;
use crate::domain::permission::{PermissionAction, PermissionModule};
use crate::domain::student_model::{Model as StudentModel, NewStudent, StudentSituation};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::student_repository::StudentRepository;
use crate::service::audit_log_service::AuditLogService;
use crate::service::matricula_allocator::MatriculaAllocator;
use crate::service::student_checks::{ensure_unique, validate_student, ValueParsing};
use sea_orm::DbConn;
use std::sync::Arc;

/// 一括インポート（行ごとに検証・保存し、失敗した行は記録して続行する）
pub struct ImportService {
    db: DbConn,
    student_repo: Arc<StudentRepository>,
    audit_log_service: Arc<AuditLogService>,
    allocator: MatriculaAllocator,
    max_rows: usize,
}

/// エラーメッセージに使う行番号（指定がなければヘッダー行を加味して index + 2）
pub fn row_number(row: &ImportRow, index: usize) -> u64 {
    row.linha.unwrap_or(index as u64 + 2)
}

impl ImportService {
    pub fn new(
        db: DbConn,
        student_repo: Arc<StudentRepository>,
        audit_log_service: Arc<AuditLogService>,
        allocator: MatriculaAllocator,
        max_rows: usize,
    ) -> Self {
        Self {
            db,
            student_repo,
            audit_log_service,
            allocator,
            max_rows,
        }
    }

    pub async fn import_many(
        &self,
        request: ImportRequest,
        actor: &ActorContext,
    ) -> AppResult<ImportSummary> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Cadastrar)?;

        if request.alunos.is_empty() {
            return Err(AppError::ValidationError(
                "alunos: Nenhum aluno informado para importação".to_string(),
            ));
        }
        if request.alunos.len() > self.max_rows {
            return Err(AppError::ValidationError(format!(
                "alunos: Limite de {} alunos por importação excedido ({} recebidos)",
                self.max_rows,
                request.alunos.len()
            )));
        }

        let mut summary = ImportSummary {
            total_processados: request.alunos.len(),
            ..Default::default()
        };

        for (index, row) in request.alunos.iter().enumerate() {
            let linha = row_number(row, index);

            match self.import_row(row, actor).await {
                Ok(student) => {
                    summary.sucesso += 1;
                    summary.alunos_importados.push(StudentResponse::from(student));
                }
                Err(reason) => {
                    summary.erros += 1;
                    summary.detalhes.push(format!("Linha {}: {}", linha, reason));
                }
            }
        }

        log_with_context!(
            tracing::Level::INFO,
            "Student import finished",
            "id_filial" => actor.id_filial,
            "total" => summary.total_processados,
            "sucesso" => summary.sucesso,
            "erros" => summary.erros,
        );

        if summary.sucesso > 0 {
            self.audit_log_service
                .record(
                    actor,
                    AuditAction::StudentsImported,
                    format!(
                        "Importou {} aluno(s) de {} linha(s) processada(s), {} erro(s)",
                        summary.sucesso, summary.total_processados, summary.erros
                    ),
                )
                .await;
        }

        Ok(summary)
    }

    /// 1 行を取り込む。失敗時は利用者向けの理由を返す
    async fn import_row(&self, row: &ImportRow, actor: &ActorContext) -> Result<StudentModel, String> {
        let student = validate_student(&row.aluno, ValueParsing::Lenient, None)
            .map_err(|errors| errors.join("; "))?;

        ensure_unique(
            &self.student_repo,
            actor.id_empresa,
            Some(&student.cpf),
            Some(&student.email),
            None,
        )
        .await
        .map_err(row_failure)?;

        let new_student = NewStudent {
            id_empresa: actor.id_empresa,
            id_filial: actor.id_filial,
            student,
            situacao: StudentSituation::Regular,
            id_pagamento: None,
            id_cliente: None,
        };

        // 行ごとに独立したトランザクション
        self.allocator
            .insert_student(&self.db, &new_student)
            .await
            .map_err(row_failure)
    }
}

fn row_failure(err: AppError) -> String {
    match err {
        AppError::ValidationError(message) => message,
        AppError::ValidationErrors(errors) => errors.join("; "),
        other => {
            tracing::error!(error = %other, "Unexpected failure while importing row");
            "Erro ao salvar aluno".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_number_defaults_to_header_offset() {
        let row = ImportRow::default();
        assert_eq!(row_number(&row, 0), 2);
        assert_eq!(row_number(&row, 1), 3);

        let explicit = ImportRow {
            linha: Some(42),
            ..Default::default()
        };
        assert_eq!(row_number(&explicit, 1), 42);
    }

    #[test]
    fn test_unexpected_errors_are_not_leaked() {
        let message = row_failure(AppError::DbErr(sea_orm::DbErr::Custom(
            "connection refused".to_string(),
        )));
        assert_eq!(message, "Erro ao salvar aluno");
        assert_eq!(
            row_failure(AppError::ValidationError("CPF repetido".to_string())),
            "CPF repetido"
        );
    }
}
