// gym-backend/src/domain/audit_log_model.rs
use super::actor::ActorContext;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub id_empresa: Uuid,
    pub id_usuario: Uuid,
    pub id_filial: Uuid,
    pub acao: String,
    #[sea_orm(column_type = "Text")]
    pub descricao: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 監査アクションの定義
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditAction {
    // 生徒関連
    StudentEnrolled,
    StudentEdited,
    StudentStatusChanged,
    StudentsImported,

    // テナント階層
    CompanyCreated,
    CompanyStatusChanged,
    BranchCreated,
    BranchStatusChanged,
    ProfileCreated,
    ProfileStatusChanged,
    UserCreated,
    UserStatusChanged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::StudentEnrolled => "ALUNO_CADASTRADO",
            AuditAction::StudentEdited => "ALUNO_EDITADO",
            AuditAction::StudentStatusChanged => "ALUNO_STATUS_ALTERADO",
            AuditAction::StudentsImported => "ALUNOS_IMPORTADOS",
            AuditAction::CompanyCreated => "EMPRESA_CADASTRADA",
            AuditAction::CompanyStatusChanged => "EMPRESA_STATUS_ALTERADO",
            AuditAction::BranchCreated => "FILIAL_CADASTRADA",
            AuditAction::BranchStatusChanged => "FILIAL_STATUS_ALTERADO",
            AuditAction::ProfileCreated => "PERFIL_CADASTRADO",
            AuditAction::ProfileStatusChanged => "PERFIL_STATUS_ALTERADO",
            AuditAction::UserCreated => "USUARIO_CADASTRADO",
            AuditAction::UserStatusChanged => "USUARIO_STATUS_ALTERADO",
        }
    }
}

// 監査ログエントリービルダー
pub struct AuditLogBuilder {
    id_empresa: Uuid,
    id_usuario: Uuid,
    id_filial: Uuid,
    action: AuditAction,
    descricao: String,
}

impl AuditLogBuilder {
    pub fn new(actor: &ActorContext, action: AuditAction) -> Self {
        Self {
            id_empresa: actor.id_empresa,
            id_usuario: actor.id_usuario,
            id_filial: actor.id_filial,
            action,
            descricao: String::new(),
        }
    }

    pub fn descricao(mut self, descricao: impl Into<String>) -> Self {
        self.descricao = descricao.into();
        self
    }

    /// 操作対象の会社が操作者と異なる場合（管理者操作）
    pub fn company(mut self, id_empresa: Uuid) -> Self {
        self.id_empresa = id_empresa;
        self
    }

    pub fn build(self) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            id_empresa: Set(self.id_empresa),
            id_usuario: Set(self.id_usuario),
            id_filial: Set(self.id_filial),
            acao: Set(self.action.as_str().to_string()),
            descricao: Set(self.descricao),
            created_at: Set(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permission::PermissionSet;

    #[test]
    fn test_builder_uses_actor_scope() {
        let actor = ActorContext {
            id_usuario: Uuid::new_v4(),
            id_empresa: Uuid::new_v4(),
            id_filial: Uuid::new_v4(),
            id_perfil: Uuid::new_v4(),
            nome_usuario: "Recepção".to_string(),
            permissoes: PermissionSet::default(),
        };

        let entry = AuditLogBuilder::new(&actor, AuditAction::StudentEnrolled)
            .descricao("Cadastrou o aluno Maria")
            .build();

        assert_eq!(entry.id_empresa, Set(actor.id_empresa));
        assert_eq!(entry.id_filial, Set(actor.id_filial));
        assert_eq!(entry.acao, Set("ALUNO_CADASTRADO".to_string()));
        assert_eq!(entry.descricao, Set("Cadastrou o aluno Maria".to_string()));
    }
}
