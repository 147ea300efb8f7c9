// gym-backend/src/api/dto/tenant_dto.rs

use crate::domain::branch_model::Model as BranchModel;
use crate::domain::company_model::Model as CompanyModel;
use crate::domain::permission::PermissionSet;
use crate::domain::profile_model::Model as ProfileModel;
use crate::domain::user_model::Model as UserModel;
use crate::utils::validation::validate_cnpj;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 会社登録
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 2, max = 150, message = "Nome deve ter entre 2 e 150 caracteres"))]
    pub nome_empresa: String,

    #[validate(custom(function = validate_cnpj))]
    pub cnpj_empresa: String,

    #[validate(email(message = "Email inválido"))]
    pub email_empresa: String,
}

/// 支店登録
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBranchRequest {
    pub id_empresa: Uuid,

    #[validate(length(min = 2, max = 150, message = "Nome deve ter entre 2 e 150 caracteres"))]
    pub nome_filial: String,

    #[validate(length(max = 255, message = "Endereço deve ter no máximo 255 caracteres"))]
    pub endereco_filial: Option<String>,
}

/// プロファイル登録（権限は型付きスキーマで検証する）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProfileRequest {
    pub id_empresa: Uuid,
    pub id_filial: Uuid,

    #[validate(length(min = 2, max = 100, message = "Nome deve ter entre 2 e 100 caracteres"))]
    pub nome_perfil: String,

    pub permissoes: serde_json::Value,
}

/// 利用者登録
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub id_perfil: Uuid,

    #[validate(length(min = 2, max = 150, message = "Nome deve ter entre 2 e 150 caracteres"))]
    pub nome_usuario: String,

    #[validate(email(message = "Email inválido"))]
    pub email_usuario: String,

    #[validate(length(min = 8, max = 128, message = "Senha deve ter entre 8 e 128 caracteres"))]
    pub senha: String,
}

/// `PUT …/alterar-status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub id: Uuid,
    pub status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub nome_empresa: String,
    pub cnpj_empresa: String,
    pub email_empresa: String,
    pub status_empresa: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CompanyModel> for CompanyResponse {
    fn from(model: CompanyModel) -> Self {
        Self {
            id: model.id,
            nome_empresa: model.nome_empresa,
            cnpj_empresa: model.cnpj_empresa,
            email_empresa: model.email_empresa,
            status_empresa: model.status_empresa,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchResponse {
    pub id: Uuid,
    pub id_empresa: Uuid,
    pub nome_filial: String,
    pub endereco_filial: Option<String>,
    pub status_filial: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BranchModel> for BranchResponse {
    fn from(model: BranchModel) -> Self {
        Self {
            id: model.id,
            id_empresa: model.id_empresa,
            nome_filial: model.nome_filial,
            endereco_filial: model.endereco_filial,
            status_filial: model.status_filial,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub nome_perfil: String,
    pub permissoes: PermissionSet,
    pub status_perfil: bool,
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn new(model: ProfileModel, permissoes: PermissionSet) -> Self {
        Self {
            id: model.id,
            id_empresa: model.id_empresa,
            id_filial: model.id_filial,
            nome_perfil: model.nome_perfil,
            permissoes,
            status_perfil: model.status_perfil,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub id_perfil: Uuid,
    pub nome_usuario: String,
    pub email_usuario: String,
    pub status_usuario: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            id_empresa: model.id_empresa,
            id_filial: model.id_filial,
            id_perfil: model.id_perfil,
            nome_usuario: model.nome_usuario,
            email_usuario: model.email_usuario,
            status_usuario: model.status_usuario,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_request_validation() {
        let valid = CreateCompanyRequest {
            nome_empresa: "Academia Central".to_string(),
            cnpj_empresa: "11.222.333/0001-81".to_string(),
            email_empresa: "contato@academia.com.br".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = CreateCompanyRequest {
            cnpj_empresa: "11.222.333/0001-80".to_string(),
            email_empresa: "sem-arroba".to_string(),
            ..valid
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("cnpj_empresa"));
        assert!(fields.contains_key("email_empresa"));
    }

    #[test]
    fn test_user_request_rejects_short_password() {
        let request = CreateUserRequest {
            id_empresa: Uuid::new_v4(),
            id_filial: Uuid::new_v4(),
            id_perfil: Uuid::new_v4(),
            nome_usuario: "Recepção".to_string(),
            email_usuario: "recepcao@academia.com.br".to_string(),
            senha: "curta".to_string(),
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("senha"));
    }
}
