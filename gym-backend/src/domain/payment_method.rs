// gym-backend/src/domain/payment_method.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 支払い方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Boleto,
    Pix,
    Credito,
    Debito,
    Link,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boleto => "boleto",
            Self::Pix => "pix",
            Self::Credito => "credito",
            Self::Debito => "debito",
            Self::Link => "link",
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self, Self::Credito | Self::Debito)
    }

    /// `aluno-cadastrar` で直接受け付ける支払い方法
    pub fn is_direct_enrollment(&self) -> bool {
        !matches!(self, Self::Link)
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boleto" => Ok(Self::Boleto),
            "pix" => Ok(Self::Pix),
            "credito" => Ok(Self::Credito),
            "debito" => Ok(Self::Debito),
            "link" => Ok(Self::Link),
            _ => Err(format!("Forma de pagamento inválida: {}", s)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_methods() {
        assert!(PaymentMethod::Credito.is_card());
        assert!(PaymentMethod::Debito.is_card());
        assert!(!PaymentMethod::Pix.is_card());
        assert!(!PaymentMethod::Link.is_direct_enrollment());
    }

    #[test]
    fn test_from_str_rejects_synonyms() {
        assert_eq!("PIX ".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert!("cartão de crédito".parse::<PaymentMethod>().is_err());
    }
}
