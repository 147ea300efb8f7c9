// src/service/audit_log_service.rs
use crate::domain::actor::ActorContext;
use crate::domain::audit_log_model::{AuditAction, AuditLogBuilder};
use crate::log_with_context;
use crate::repository::audit_log_repository::AuditLogRepository;
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::sync::Arc;
use uuid::Uuid;

/// 監査ログの書き込み（失敗しても呼び出し元には伝えない）
pub struct AuditLogService {
    audit_log_repo: Arc<AuditLogRepository>,
}

impl AuditLogService {
    pub fn new(audit_log_repo: Arc<AuditLogRepository>) -> Self {
        Self { audit_log_repo }
    }

    pub async fn record(
        &self,
        actor: &ActorContext,
        action: AuditAction,
        descricao: impl Into<String>,
    ) {
        let entry = AuditLogBuilder::new(actor, action).descricao(descricao).build();
        if let Err(e) = self.audit_log_repo.create(entry).await {
            log_with_context!(
                tracing::Level::WARN,
                "Failed to record audit log",
                "action" => action.as_str(),
                "id_usuario" => actor.id_usuario,
                "error" => e.to_string(),
            );
        }
    }

    /// 操作対象が別会社の場合（管理者によるテナント操作）
    pub async fn record_for_company(
        &self,
        actor: &ActorContext,
        id_empresa: Uuid,
        action: AuditAction,
        descricao: impl Into<String>,
    ) {
        let entry = AuditLogBuilder::new(actor, action)
            .company(id_empresa)
            .descricao(descricao)
            .build();
        if let Err(e) = self.audit_log_repo.create(entry).await {
            log_with_context!(
                tracing::Level::WARN,
                "Failed to record audit log",
                "action" => action.as_str(),
                "id_empresa" => id_empresa,
                "error" => e.to_string(),
            );
        }
    }

    /// 呼び出し元のトランザクション内にセーブポイントを切って記録する
    ///
    /// 失敗してもセーブポイントだけを巻き戻し、外側のトランザクションは継続できる。
    pub async fn record_in<C>(
        conn: &C,
        actor: &ActorContext,
        action: AuditAction,
        descricao: impl Into<String>,
    ) where
        C: ConnectionTrait + TransactionTrait,
    {
        let entry = AuditLogBuilder::new(actor, action).descricao(descricao).build();

        let savepoint = match conn.begin().await {
            Ok(savepoint) => savepoint,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    action = action.as_str(),
                    "Could not open audit savepoint"
                );
                return;
            }
        };

        match AuditLogRepository::create_with(&savepoint, entry).await {
            Ok(_) => {
                if let Err(e) = savepoint.commit().await {
                    tracing::warn!(
                        error = %e,
                        action = action.as_str(),
                        "Could not release audit savepoint"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    action = action.as_str(),
                    "Failed to record audit log"
                );
                if let Err(e) = savepoint.rollback().await {
                    tracing::warn!(error = %e, "Could not roll back audit savepoint");
                }
            }
        }
    }
}
