// gym-backend/src/utils/normalize.rs

//! インポート行の自由記述を支払い方法・プランのコードに正規化する

use crate::domain::payment_method::PaymentMethod;
use crate::domain::plan::PlanTier;

/// 小文字化・アクセント除去・区切り文字の統一
pub fn fold(raw: &str) -> String {
    let lowered: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '-' | '_' | '/' | '.' => ' ',
            other => other,
        })
        .collect();

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_payment_method(raw: &str) -> Option<PaymentMethod> {
    match fold(raw).as_str() {
        "credito" | "cartao de credito" | "cartao credito" | "credit" | "credit card"
        | "card" | "cartao" | "cc" => Some(PaymentMethod::Credito),
        "debito" | "cartao de debito" | "cartao debito" | "debit" | "debit card" => {
            Some(PaymentMethod::Debito)
        }
        "pix" => Some(PaymentMethod::Pix),
        "boleto" | "boleto bancario" | "bank slip" | "bankslip" | "slip" => {
            Some(PaymentMethod::Boleto)
        }
        "link" | "link de pagamento" | "payment link" => Some(PaymentMethod::Link),
        _ => None,
    }
}

pub fn normalize_plan(raw: &str) -> Option<PlanTier> {
    match fold(raw).as_str() {
        "mensal" | "monthly" | "month" | "mes" | "1 mes" | "plano mensal" => {
            Some(PlanTier::Mensal)
        }
        "trimestral" | "quarterly" | "trimestre" | "3 meses" | "plano trimestral" => {
            Some(PlanTier::Trimestral)
        }
        "semestral" | "semiannual" | "semi annual" | "semestre" | "6 meses"
        | "plano semestral" => Some(PlanTier::Semestral),
        "anual" | "annual" | "yearly" | "ano" | "12 meses" | "plano anual" => {
            Some(PlanTier::Anual)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        assert_eq!(fold("  Cartão   de Crédito "), "cartao de credito");
        assert_eq!(fold("payment-link"), "payment link");
    }

    #[test]
    fn test_credit_synonyms() {
        for raw in ["Cartão de Crédito", "credit", "CARD", "crédito", "Credit Card"] {
            assert_eq!(
                normalize_payment_method(raw),
                Some(PaymentMethod::Credito),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_other_methods() {
        assert_eq!(normalize_payment_method("Pix "), Some(PaymentMethod::Pix));
        assert_eq!(normalize_payment_method("débito"), Some(PaymentMethod::Debito));
        assert_eq!(normalize_payment_method("bank slip"), Some(PaymentMethod::Boleto));
        assert_eq!(
            normalize_payment_method("Boleto Bancário"),
            Some(PaymentMethod::Boleto)
        );
        assert_eq!(normalize_payment_method("dinheiro"), None);
    }

    #[test]
    fn test_plans() {
        assert_eq!(normalize_plan("Mensal"), Some(PlanTier::Mensal));
        assert_eq!(normalize_plan("quarterly"), Some(PlanTier::Trimestral));
        assert_eq!(normalize_plan("6 meses"), Some(PlanTier::Semestral));
        assert_eq!(normalize_plan("ANUAL "), Some(PlanTier::Anual));
        assert_eq!(normalize_plan("bienal"), None);
    }
}
