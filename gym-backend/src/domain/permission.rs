// gym-backend/src/domain/permission.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 権限モジュール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionModule {
    Alunos,
    Financeiro,
    Usuarios,
    Filiais,
    Perfis,
}

impl PermissionModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionModule::Alunos => "alunos",
            PermissionModule::Financeiro => "financeiro",
            PermissionModule::Usuarios => "usuarios",
            PermissionModule::Filiais => "filiais",
            PermissionModule::Perfis => "perfis",
        }
    }
}

/// モジュールに対する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    Visualizar,
    Cadastrar,
    Editar,
    Excluir,
}

impl PermissionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Visualizar => "visualizar",
            PermissionAction::Cadastrar => "cadastrar",
            PermissionAction::Editar => "editar",
            PermissionAction::Excluir => "excluir",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// モジュール単位の操作フラグ（未指定は false）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulePermissions {
    pub visualizar: bool,
    pub cadastrar: bool,
    pub editar: bool,
    pub excluir: bool,
}

impl ModulePermissions {
    pub fn full() -> Self {
        Self {
            visualizar: true,
            cadastrar: true,
            editar: true,
            excluir: true,
        }
    }

    pub fn allows(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::Visualizar => self.visualizar,
            PermissionAction::Cadastrar => self.cadastrar,
            PermissionAction::Editar => self.editar,
            PermissionAction::Excluir => self.excluir,
        }
    }
}

/// プロファイルに保存される権限セット
///
/// JSON で保存され、未知のキーはパース時に拒否される。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PermissionSet {
    pub admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alunos: Option<ModulePermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financeiro: Option<ModulePermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuarios: Option<ModulePermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filiais: Option<ModulePermissions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfis: Option<ModulePermissions>,
}

impl PermissionSet {
    pub fn administrator() -> Self {
        Self {
            admin: true,
            ..Self::default()
        }
    }

    /// JSON 値から権限セットを復元
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        serde_json::from_value(value.clone()).map_err(|e| format!("Permissões inválidas: {}", e))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    pub fn module(&self, module: PermissionModule) -> Option<&ModulePermissions> {
        match module {
            PermissionModule::Alunos => self.alunos.as_ref(),
            PermissionModule::Financeiro => self.financeiro.as_ref(),
            PermissionModule::Usuarios => self.usuarios.as_ref(),
            PermissionModule::Filiais => self.filiais.as_ref(),
            PermissionModule::Perfis => self.perfis.as_ref(),
        }
    }

    /// admin は全操作を許可する
    pub fn allows(&self, module: PermissionModule, action: PermissionAction) -> bool {
        if self.admin {
            return true;
        }
        self.module(module).is_some_and(|m| m.allows(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admin_implies_everything() {
        let set = PermissionSet::administrator();
        assert!(set.allows(PermissionModule::Alunos, PermissionAction::Excluir));
        assert!(set.allows(PermissionModule::Perfis, PermissionAction::Cadastrar));
    }

    #[test]
    fn test_module_flags_default_to_false() {
        let set = PermissionSet::from_json(&json!({
            "alunos": { "visualizar": true }
        }))
        .unwrap();

        assert!(!set.admin);
        assert!(set.allows(PermissionModule::Alunos, PermissionAction::Visualizar));
        assert!(!set.allows(PermissionModule::Alunos, PermissionAction::Cadastrar));
        assert!(!set.allows(PermissionModule::Financeiro, PermissionAction::Visualizar));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(PermissionSet::from_json(&json!({ "superuser": true })).is_err());
        assert!(PermissionSet::from_json(&json!({
            "alunos": { "ver": true }
        }))
        .is_err());
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(PermissionSet::from_json(&json!({ "admin": "sim" })).is_err());
        assert!(PermissionSet::from_json(&json!([1, 2, 3])).is_err());
    }
}
