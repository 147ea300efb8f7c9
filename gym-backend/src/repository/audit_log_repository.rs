// src/repository/audit_log_repository.rs
use crate::domain::audit_log_model::{ActiveModel as AuditLogActiveModel, Model as AuditLogModel};
use sea_orm::{entity::*, ConnectionTrait, DbConn, DbErr};

pub struct AuditLogRepository {
    db: DbConn,
}

impl AuditLogRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    // 監査ログの作成
    pub async fn create(&self, audit_log: AuditLogActiveModel) -> Result<AuditLogModel, DbErr> {
        Self::create_with(&self.db, audit_log).await
    }

    /// 呼び出し元のトランザクション内で作成
    pub async fn create_with<C: ConnectionTrait>(
        conn: &C,
        audit_log: AuditLogActiveModel,
    ) -> Result<AuditLogModel, DbErr> {
        audit_log.insert(conn).await
    }
}
