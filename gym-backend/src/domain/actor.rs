// gym-backend/src/domain/actor.rs

use super::permission::{PermissionAction, PermissionModule, PermissionSet};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// リクエストを実行している利用者とそのテナントスコープ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub id_usuario: Uuid,
    pub id_empresa: Uuid,
    pub id_filial: Uuid,
    pub id_perfil: Uuid,
    pub nome_usuario: String,
    pub permissoes: PermissionSet,
}

impl ActorContext {
    pub fn is_admin(&self) -> bool {
        self.permissoes.admin
    }

    pub fn ensure_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Acesso restrito a administradores".to_string(),
            ))
        }
    }

    pub fn ensure_permission(
        &self,
        module: PermissionModule,
        action: PermissionAction,
    ) -> AppResult<()> {
        if self.permissoes.allows(module, action) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Sem permissão para {} em {}",
                action.as_str(),
                module.as_str()
            )))
        }
    }
}
