// src/repository/user_repository.rs

use crate::domain::user_model::{
    self, ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel,
};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter};
use uuid::Uuid;

#[derive(Debug)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// ユーザーをIDで検索
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    /// ユーザーをメールアドレスで検索（保存時に小文字化済み）
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::EmailUsuario.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
    }

    pub async fn create(&self, user: UserActiveModel) -> Result<UserModel, DbErr> {
        user.insert(&self.db).await
    }

    pub async fn set_status(&self, id: Uuid, status: bool) -> Result<UserModel, DbErr> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("usuário".to_string()))?;
        let mut active: UserActiveModel = user.into();
        active.status_usuario = Set(status);
        active.update(&self.db).await
    }
}
