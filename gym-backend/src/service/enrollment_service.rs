// gym-backend/src/service/enrollment_service.rs

use crate::api::dto::student_dto::{
    BoletoInfo, ConfirmLinkRequest, ConfirmPixRequest, ConfirmationOutcome, EnrollRequest,
    EnrollmentKind, EnrollmentResponse, PaymentInfo, PaymentLinkResponse, PixInfo,
    StudentPayload,
};
use crate::domain::actor::ActorContext;
use crate::domain::audit_log_model::AuditAction;
use crate::domain::payment_method::PaymentMethod;
use crate::domain::permission::{PermissionAction, PermissionModule};
use crate::domain::student_model::{
    Model as StudentModel, NewStudent, StudentSituation, ValidatedStudent,
};
use crate::error::{AppError, AppResult};
use crate::gateway::{centavos_to_reais, Charge, ChargeArtifacts};
use crate::log_with_context;
use crate::repository::student_repository::StudentRepository;
use crate::repository::transaction_repository::{NewTransaction, TransactionRepository};
use crate::service::audit_log_service::AuditLogService;
use crate::service::matricula_allocator::MatriculaAllocator;
use crate::service::payment_service::PaymentService;
use crate::service::student_checks::{
    ensure_unique, validate_card_payload, validate_student, ValueParsing,
};
use chrono::Utc;
use sea_orm::{DatabaseTransaction, DbConn, TransactionTrait};
use std::sync::Arc;
use tracing::{info, warn};

/// 永続化する入学内容
struct EnrollmentRecord {
    new_student: NewStudent,
    valor_centavos: i64,
    settled: bool,
    id_pagamento_externo: String,
}

pub struct EnrollmentService {
    db: DbConn,
    student_repo: Arc<StudentRepository>,
    transaction_repo: Arc<TransactionRepository>,
    payment_service: Arc<PaymentService>,
    allocator: MatriculaAllocator,
}

impl EnrollmentService {
    pub fn new(
        db: DbConn,
        student_repo: Arc<StudentRepository>,
        transaction_repo: Arc<TransactionRepository>,
        payment_service: Arc<PaymentService>,
        allocator: MatriculaAllocator,
    ) -> Self {
        Self {
            db,
            student_repo,
            transaction_repo,
            payment_service,
            allocator,
        }
    }

    /// 入学（ボレート・PIX・カード）
    pub async fn enroll(
        &self,
        request: EnrollRequest,
        actor: &ActorContext,
    ) -> AppResult<EnrollmentResponse> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Cadastrar)?;

        let student = validate_student(&request.aluno, ValueParsing::Strict, None)
            .map_err(AppError::ValidationErrors)?;

        if !student.forma_pagamento.is_direct_enrollment() {
            return Err(AppError::ValidationError(
                "forma_pagamento: Pagamento por link deve usar iniciar-cadastro-aluno".to_string(),
            ));
        }

        let card = if student.forma_pagamento.is_card() {
            Some(validate_card_payload(
                request.dados_cartao.as_ref(),
                Utc::now().date_naive(),
            )?)
        } else {
            None
        };

        self.ensure_unique(&student, actor).await?;

        let charge = self.payment_service.charge(&student, card).await?;

        match student.forma_pagamento {
            PaymentMethod::Boleto => self.complete_boleto(student, charge, actor).await,
            PaymentMethod::Pix => Ok(Self::pix_response(student, charge)),
            _ => self.complete_card(student, charge, actor).await,
        }
    }

    async fn complete_boleto(
        &self,
        student: ValidatedStudent,
        charge: Charge,
        actor: &ActorContext,
    ) -> AppResult<EnrollmentResponse> {
        let record = EnrollmentRecord {
            new_student: NewStudent {
                id_empresa: actor.id_empresa,
                id_filial: actor.id_filial,
                student,
                situacao: StudentSituation::AwaitingPayment,
                id_pagamento: Some(charge.id.clone()),
                id_cliente: Some(charge.customer_id.clone()),
            },
            valor_centavos: charge.valor_centavos,
            settled: false,
            id_pagamento_externo: charge.id.clone(),
        };

        let saved = self.persist_or_compensate(record, &charge.id, actor).await?;

        let mut response = EnrollmentResponse::new(
            "Aluno cadastrado. Boleto gerado e aguardando pagamento",
            EnrollmentKind::Boleto,
        )
        .with_student(saved);

        if let ChargeArtifacts::Boleto {
            url,
            barcode,
            due_date,
        } = charge.artifacts
        {
            response = response.with_boleto(BoletoInfo {
                id: charge.id,
                link: url,
                codigo_barras: barcode,
                vencimento: due_date,
                valor: centavos_to_reais(charge.valor_centavos),
            });
        }

        Ok(response)
    }

    async fn complete_card(
        &self,
        student: ValidatedStudent,
        charge: Charge,
        actor: &ActorContext,
    ) -> AppResult<EnrollmentResponse> {
        let record = EnrollmentRecord {
            new_student: NewStudent {
                id_empresa: actor.id_empresa,
                id_filial: actor.id_filial,
                student,
                situacao: StudentSituation::Regular,
                id_pagamento: Some(charge.id.clone()),
                id_cliente: Some(charge.customer_id.clone()),
            },
            valor_centavos: charge.valor_centavos,
            settled: true,
            id_pagamento_externo: charge.id.clone(),
        };

        let saved = self.persist_or_compensate(record, &charge.id, actor).await?;

        Ok(
            EnrollmentResponse::new("Pagamento aprovado e aluno cadastrado", EnrollmentKind::Cartao)
                .with_student(saved)
                .with_payment(PaymentInfo {
                    id: charge.id,
                    status: "aprovado".to_string(),
                    aprovado: true,
                    valor: centavos_to_reais(charge.valor_centavos),
                }),
        )
    }

    fn pix_response(student: ValidatedStudent, charge: Charge) -> EnrollmentResponse {
        let mut response = EnrollmentResponse::new(
            "Cobrança PIX gerada. Confirme o pagamento para concluir o cadastro",
            EnrollmentKind::Pix,
        )
        .with_pending(StudentPayload::from(&student));

        if let ChargeArtifacts::Pix {
            payload,
            image_base64,
            expires_at,
        } = charge.artifacts
        {
            response = response.with_pix(PixInfo {
                id: charge.id,
                id_cliente: charge.customer_id,
                qr_code: payload,
                qr_code_imagem: image_base64,
                expira_em: expires_at,
                valor: centavos_to_reais(charge.valor_centavos),
            });
        }

        response
    }

    /// PIX の支払いを確認して入学させる
    pub async fn confirm_pix(
        &self,
        request: ConfirmPixRequest,
        actor: &ActorContext,
    ) -> AppResult<ConfirmationOutcome> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Cadastrar)?;

        let id_pagamento = request.id_pagamento.trim().to_string();
        if id_pagamento.is_empty() {
            return Err(AppError::ValidationError(
                "id_pagamento: Campo obrigatório".to_string(),
            ));
        }

        if let Some(existing) = self.find_confirmed(&id_pagamento, actor).await? {
            return Ok(Self::already_confirmed(existing, EnrollmentKind::Pix));
        }

        let student = validate_student(&request.aluno, ValueParsing::Strict, Some(PaymentMethod::Pix))
            .map_err(AppError::ValidationErrors)?;
        self.ensure_unique(&student, actor).await?;

        let snapshot = self.payment_service.charge_status(&id_pagamento).await?;
        if !snapshot.status.is_paid() {
            return Err(AppError::ValidationError(
                "Pagamento ainda não confirmado".to_string(),
            ));
        }
        self.ensure_plan_value(&student, snapshot.valor_centavos)?;
        self.payment_service
            .ensure_charge_owner(&snapshot, &student.cpf)
            .await?;

        let record = EnrollmentRecord {
            new_student: NewStudent {
                id_empresa: actor.id_empresa,
                id_filial: actor.id_filial,
                student,
                situacao: StudentSituation::Regular,
                id_pagamento: Some(id_pagamento.clone()),
                id_cliente: snapshot.customer_id.clone().or(request.id_cliente),
            },
            valor_centavos: snapshot.valor_centavos,
            settled: true,
            id_pagamento_externo: id_pagamento.clone(),
        };

        self.persist_confirmed(record, EnrollmentKind::Pix, actor).await
    }

    /// 支払いリンクを作成する（生徒はまだ保存しない）
    pub async fn start_link_enrollment(
        &self,
        payload: StudentPayload,
        actor: &ActorContext,
    ) -> AppResult<PaymentLinkResponse> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Cadastrar)?;

        let student = validate_student(&payload, ValueParsing::Strict, Some(PaymentMethod::Link))
            .map_err(AppError::ValidationErrors)?;
        self.ensure_unique(&student, actor).await?;

        let link = self.payment_service.create_payment_link(&student).await?;

        log_with_context!(
            tracing::Level::INFO,
            "Payment link created",
            "link_id" => &link.id,
            "id_filial" => actor.id_filial,
        );

        Ok(PaymentLinkResponse::new(
            link.id,
            link.url,
            self.payment_service.price_for(student.plano),
            PaymentService::description_for(&student),
            StudentPayload::from(&student),
        ))
    }

    /// 支払いリンクの入金を確認して入学させる
    pub async fn confirm_link(
        &self,
        request: ConfirmLinkRequest,
        actor: &ActorContext,
    ) -> AppResult<ConfirmationOutcome> {
        actor.ensure_permission(PermissionModule::Alunos, PermissionAction::Cadastrar)?;

        let link_id = request.id_link_pagamento.trim().to_string();
        if link_id.is_empty() {
            return Err(AppError::ValidationError(
                "id_link_pagamento: Campo obrigatório".to_string(),
            ));
        }

        let status = self.payment_service.payment_link_status(&link_id).await?;
        if !status.paid {
            return Err(AppError::ValidationError(
                "Pagamento ainda não confirmado".to_string(),
            ));
        }
        let id_pagamento = status.payment_id.clone().unwrap_or_else(|| link_id.clone());

        if let Some(existing) = self.find_confirmed(&id_pagamento, actor).await? {
            return Ok(Self::already_confirmed(existing, EnrollmentKind::Cartao));
        }

        let student = validate_student(&request.aluno, ValueParsing::Strict, Some(PaymentMethod::Link))
            .map_err(AppError::ValidationErrors)?;
        self.ensure_unique(&student, actor).await?;

        let price = self.payment_service.price_for(student.plano);
        let valor_centavos = status.valor_centavos.unwrap_or(price);
        self.ensure_plan_value(&student, valor_centavos)?;

        let record = EnrollmentRecord {
            new_student: NewStudent {
                id_empresa: actor.id_empresa,
                id_filial: actor.id_filial,
                student,
                situacao: StudentSituation::Regular,
                id_pagamento: Some(id_pagamento.clone()),
                id_cliente: None,
            },
            valor_centavos,
            settled: true,
            id_pagamento_externo: id_pagamento,
        };

        self.persist_confirmed(record, EnrollmentKind::Cartao, actor).await
    }

    async fn ensure_unique(&self, student: &ValidatedStudent, actor: &ActorContext) -> AppResult<()> {
        ensure_unique(
            &self.student_repo,
            actor.id_empresa,
            Some(&student.cpf),
            Some(&student.email),
            None,
        )
        .await
    }

    fn ensure_plan_value(&self, student: &ValidatedStudent, valor_centavos: i64) -> AppResult<()> {
        let expected = self.payment_service.price_for(student.plano);
        if valor_centavos != expected {
            warn!(
                plano = %student.plano,
                expected,
                received = valor_centavos,
                "Confirmed payment value does not match plan price"
            );
            return Err(AppError::ValidationError(format!(
                "Valor pago (R$ {:.2}) não corresponde ao {} (R$ {:.2})",
                centavos_to_reais(valor_centavos),
                student.plano.display_name(),
                centavos_to_reais(expected)
            )));
        }
        Ok(())
    }

    /// 同じ外部支払いIDで既に入学済みの生徒
    async fn find_confirmed(
        &self,
        id_pagamento: &str,
        actor: &ActorContext,
    ) -> AppResult<Option<StudentModel>> {
        let Some(transaction) = self.transaction_repo.find_by_external_id(id_pagamento).await?
        else {
            return Ok(None);
        };

        match self
            .student_repo
            .find_for_company(transaction.id_aluno, actor.id_empresa)
            .await?
        {
            Some(student) => Ok(Some(student)),
            None => Err(AppError::ValidationError(
                "Pagamento já utilizado em outro cadastro".to_string(),
            )),
        }
    }

    fn already_confirmed(student: StudentModel, tipo: EnrollmentKind) -> ConfirmationOutcome {
        ConfirmationOutcome {
            response: EnrollmentResponse::new("Pagamento já confirmado anteriormente", tipo)
                .with_student(student),
            created: false,
        }
    }

    async fn persist_confirmed(
        &self,
        record: EnrollmentRecord,
        tipo: EnrollmentKind,
        actor: &ActorContext,
    ) -> AppResult<ConfirmationOutcome> {
        let id_pagamento = record.id_pagamento_externo.clone();
        let valor_centavos = record.valor_centavos;

        match self.persist(record, actor).await {
            Ok(saved) => Ok(ConfirmationOutcome {
                response: EnrollmentResponse::new("Pagamento confirmado e aluno cadastrado", tipo)
                    .with_student(saved)
                    .with_payment(PaymentInfo {
                        id: id_pagamento,
                        status: "confirmado".to_string(),
                        aprovado: true,
                        valor: centavos_to_reais(valor_centavos),
                    }),
                created: true,
            }),
            // 同時に届いた確認が先に保存した場合は、どの制約で失敗しても既存の生徒を返す
            Err(e) => match self.find_confirmed(&id_pagamento, actor).await {
                Ok(Some(existing)) => {
                    info!(
                        id_pagamento = %id_pagamento,
                        error = %e,
                        "Concurrent confirmation already enrolled student"
                    );
                    Ok(Self::already_confirmed(existing, tipo))
                }
                Err(used_elsewhere @ AppError::ValidationError(_)) => Err(used_elsewhere),
                Ok(None) | Err(_) => Err(e),
            },
        }
    }

    async fn persist_or_compensate(
        &self,
        record: EnrollmentRecord,
        charge_id: &str,
        actor: &ActorContext,
    ) -> AppResult<StudentModel> {
        match self.persist(record, actor).await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::error!(
                    charge_id = %charge_id,
                    error = %e,
                    "Enrollment persistence failed after gateway charge"
                );
                self.payment_service.cancel_charge_best_effort(charge_id).await;
                Err(e)
            }
        }
    }

    /// 生徒・トランザクション・監査ログを 1 つのトランザクションで保存する
    async fn persist(&self, record: EnrollmentRecord, actor: &ActorContext) -> AppResult<StudentModel> {
        let txn = self.db.begin().await?;

        match self.write_enrollment(&txn, &record, actor).await {
            Ok(saved) => {
                txn.commit().await?;
                log_with_context!(
                    tracing::Level::INFO,
                    "Student enrolled",
                    "id_aluno" => saved.id,
                    "matricula" => &saved.matricula_aluno,
                    "forma_pagamento" => &saved.forma_pagamento,
                    "id_filial" => saved.id_filial,
                );
                Ok(saved)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Failed to roll back enrollment transaction");
                }
                Err(e)
            }
        }
    }

    async fn write_enrollment(
        &self,
        txn: &DatabaseTransaction,
        record: &EnrollmentRecord,
        actor: &ActorContext,
    ) -> AppResult<StudentModel> {
        let saved = self
            .allocator
            .insert_student(txn, &record.new_student)
            .await?;

        TransactionRepository::insert(
            txn,
            NewTransaction {
                id_aluno: saved.id,
                id_empresa: saved.id_empresa,
                id_filial: saved.id_filial,
                valor_centavos: record.valor_centavos,
                forma_pagamento: saved.forma_pagamento.clone(),
                settled: record.settled,
                id_pagamento_externo: Some(record.id_pagamento_externo.clone()),
            },
        )
        .await?;

        AuditLogService::record_in(
            txn,
            actor,
            AuditAction::StudentEnrolled,
            format!(
                "Cadastrou o aluno {} (matrícula {}) no {} com pagamento via {} ({})",
                saved.nome_aluno,
                saved.matricula_aluno,
                record.new_student.student.plano.display_name(),
                saved.forma_pagamento,
                record.new_student.situacao
            ),
        )
        .await;

        Ok(saved)
    }
}
