// src/repository/transaction_repository.rs

use crate::domain::transaction_model::{
    self, ActiveModel as TransactionActiveModel, Entity as TransactionEntity,
    Model as TransactionModel,
};
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbConn, DbErr, QueryFilter};
use uuid::Uuid;

/// 新規トランザクションの内容
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id_aluno: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub valor_centavos: i64,
    pub forma_pagamento: String,
    pub settled: bool,
    pub id_pagamento_externo: Option<String>,
}

pub struct TransactionRepository {
    db: DbConn,
}

impl TransactionRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// ゲートウェイの支払いIDで検索
    pub async fn find_by_external_id(
        &self,
        id_pagamento_externo: &str,
    ) -> Result<Option<TransactionModel>, DbErr> {
        TransactionEntity::find()
            .filter(transaction_model::Column::IdPagamentoExterno.eq(id_pagamento_externo))
            .one(&self.db)
            .await
    }

    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        transaction: NewTransaction,
    ) -> Result<TransactionModel, DbErr> {
        let model = TransactionActiveModel {
            id: Set(Uuid::new_v4()),
            id_aluno: Set(transaction.id_aluno),
            id_empresa: Set(transaction.id_empresa),
            id_filial: Set(transaction.id_filial),
            valor_centavos: Set(transaction.valor_centavos),
            forma_pagamento: Set(transaction.forma_pagamento),
            status: Set(transaction.settled),
            id_pagamento_externo: Set(transaction.id_pagamento_externo),
            created_at: Set(chrono::Utc::now()),
        };
        model.insert(conn).await
    }
}
