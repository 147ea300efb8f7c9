// src/repository/branch_repository.rs

use crate::domain::branch_model::{
    self, ActiveModel as BranchActiveModel, Entity as BranchEntity, Model as BranchModel,
};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter};
use uuid::Uuid;

pub struct BranchRepository {
    db: DbConn,
}

impl BranchRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BranchModel>, DbErr> {
        BranchEntity::find_by_id(id).one(&self.db).await
    }

    /// 会社に属する支店のみ取得
    pub async fn find_for_company(
        &self,
        id: Uuid,
        id_empresa: Uuid,
    ) -> Result<Option<BranchModel>, DbErr> {
        BranchEntity::find_by_id(id)
            .filter(branch_model::Column::IdEmpresa.eq(id_empresa))
            .one(&self.db)
            .await
    }

    pub async fn create(&self, branch: BranchActiveModel) -> Result<BranchModel, DbErr> {
        branch.insert(&self.db).await
    }

    pub async fn set_status(&self, id: Uuid, status: bool) -> Result<BranchModel, DbErr> {
        let branch = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("filial".to_string()))?;
        let mut active: BranchActiveModel = branch.into();
        active.status_filial = Set(status);
        active.update(&self.db).await
    }
}
