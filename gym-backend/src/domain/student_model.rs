// gym-backend/src/domain/student_model.rs
use super::payment_method::PaymentMethod;
use super::plan::PlanTier;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alunos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub nome_aluno: String,
    pub email_aluno: String,
    pub telefone_aluno: String,
    pub cpf_aluno: String,
    pub plano_aluno: String,
    pub forma_pagamento: String,
    pub situacao: String,
    pub status_aluno: bool,
    pub matricula_aluno: String,
    #[sea_orm(nullable)]
    pub id_pagamento: Option<String>,
    #[sea_orm(nullable)]
    pub id_cliente: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company_model::Entity",
        from = "Column::IdEmpresa",
        to = "super::company_model::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::branch_model::Entity",
        from = "Column::IdFilial",
        to = "super::branch_model::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Branch,
    #[sea_orm(has_many = "super::transaction_model::Entity")]
    Transactions,
}

impl Related<super::company_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::branch_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::transaction_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

/// 生徒の支払い状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentSituation {
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "aguardando pagamento")]
    AwaitingPayment,
}

impl StudentSituation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentSituation::Regular => "regular",
            StudentSituation::AwaitingPayment => "aguardando pagamento",
        }
    }
}

impl fmt::Display for StudentSituation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 検証・正規化済みの生徒データ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStudent {
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cpf: String,
    pub plano: PlanTier,
    pub forma_pagamento: PaymentMethod,
}

/// 挿入待ちの生徒（マトリキュラ番号は挿入時に決まる）
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub student: ValidatedStudent,
    pub situacao: StudentSituation,
    pub id_pagamento: Option<String>,
    pub id_cliente: Option<String>,
}

impl NewStudent {
    pub fn to_active_model(&self, matricula: &str) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            id_empresa: Set(self.id_empresa),
            id_filial: Set(self.id_filial),
            nome_aluno: Set(self.student.nome.clone()),
            email_aluno: Set(self.student.email.clone()),
            telefone_aluno: Set(self.student.telefone.clone()),
            cpf_aluno: Set(self.student.cpf.clone()),
            plano_aluno: Set(self.student.plano.as_str().to_string()),
            forma_pagamento: Set(self.student.forma_pagamento.as_str().to_string()),
            situacao: Set(self.situacao.as_str().to_string()),
            status_aluno: Set(true),
            matricula_aluno: Set(matricula.to_string()),
            id_pagamento: Set(self.id_pagamento.clone()),
            id_cliente: Set(self.id_cliente.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}
