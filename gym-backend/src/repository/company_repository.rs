// src/repository/company_repository.rs

use crate::domain::company_model::{
    self, ActiveModel as CompanyActiveModel, Entity as CompanyEntity, Model as CompanyModel,
};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter};
use uuid::Uuid;

pub struct CompanyRepository {
    db: DbConn,
}

impl CompanyRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CompanyModel>, DbErr> {
        CompanyEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<CompanyModel>, DbErr> {
        CompanyEntity::find()
            .filter(company_model::Column::CnpjEmpresa.eq(cnpj))
            .one(&self.db)
            .await
    }

    pub async fn create(&self, company: CompanyActiveModel) -> Result<CompanyModel, DbErr> {
        company.insert(&self.db).await
    }

    pub async fn set_status(&self, id: Uuid, status: bool) -> Result<CompanyModel, DbErr> {
        let company = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("empresa".to_string()))?;
        let mut active: CompanyActiveModel = company.into();
        active.status_empresa = Set(status);
        active.update(&self.db).await
    }
}
