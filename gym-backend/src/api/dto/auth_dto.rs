// gym-backend/src/api/dto/auth_dto.rs

use crate::domain::permission::PermissionSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// ログインリクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub senha: String,
}

/// ログインした利用者の情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id_usuario: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub id_perfil: Uuid,
    pub nome_usuario: String,
    pub email_usuario: String,
    pub permissoes: PermissionSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub usuario: AuthenticatedUser,
}
