// gym-backend/src/domain/transaction_model.rs
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transacoes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub id_aluno: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub valor_centavos: i64,
    pub forma_pagamento: String,
    /// 決済済みなら true、支払い待ちなら false
    pub status: bool,
    #[sea_orm(nullable, unique)]
    pub id_pagamento_externo: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student_model::Entity",
        from = "Column::IdAluno",
        to = "super::student_model::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::student_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
