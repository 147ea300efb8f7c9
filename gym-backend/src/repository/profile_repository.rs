// src/repository/profile_repository.rs

use crate::domain::profile_model::{
    self, ActiveModel as ProfileActiveModel, Entity as ProfileEntity, Model as ProfileModel,
};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter};
use uuid::Uuid;

pub struct ProfileRepository {
    db: DbConn,
}

impl ProfileRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileModel>, DbErr> {
        ProfileEntity::find_by_id(id).one(&self.db).await
    }

    /// 会社に属するプロファイルのみ取得
    pub async fn find_for_company(
        &self,
        id: Uuid,
        id_empresa: Uuid,
    ) -> Result<Option<ProfileModel>, DbErr> {
        ProfileEntity::find_by_id(id)
            .filter(profile_model::Column::IdEmpresa.eq(id_empresa))
            .one(&self.db)
            .await
    }

    pub async fn create(&self, profile: ProfileActiveModel) -> Result<ProfileModel, DbErr> {
        profile.insert(&self.db).await
    }

    pub async fn set_status(&self, id: Uuid, status: bool) -> Result<ProfileModel, DbErr> {
        let profile = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("perfil".to_string()))?;
        let mut active: ProfileActiveModel = profile.into();
        active.status_perfil = Set(status);
        active.update(&self.db).await
    }
}
