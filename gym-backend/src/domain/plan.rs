// gym-backend/src/domain/plan.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 受講プラン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Mensal,
    Trimestral,
    Semestral,
    Anual,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mensal => "mensal",
            Self::Trimestral => "trimestral",
            Self::Semestral => "semestral",
            Self::Anual => "anual",
        }
    }

    /// 請求説明に使う表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mensal => "Plano Mensal",
            Self::Trimestral => "Plano Trimestral",
            Self::Semestral => "Plano Semestral",
            Self::Anual => "Plano Anual",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            Self::Mensal => 1,
            Self::Trimestral => 3,
            Self::Semestral => 6,
            Self::Anual => 12,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Mensal, Self::Trimestral, Self::Semestral, Self::Anual]
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mensal" => Ok(Self::Mensal),
            "trimestral" => Ok(Self::Trimestral),
            "semestral" => Ok(Self::Semestral),
            "anual" => Ok(Self::Anual),
            _ => Err(format!("Plano inválido: {}", s)),
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
