// gym-backend/src/service/student_checks.rs

//! 入学・インポート・編集で共有する生徒データの検証と重複チェック

use crate::api::dto::student_dto::{CardPayload, StudentPayload};
use crate::domain::payment_method::PaymentMethod;
use crate::domain::plan::PlanTier;
use crate::domain::student_model::ValidatedStudent;
use crate::error::{AppError, AppResult};
use crate::gateway::CardData;
use crate::repository::student_repository::StudentRepository;
use crate::utils::normalize::{normalize_payment_method, normalize_plan};
use crate::utils::validation::{clean_phone, is_valid_email, validate_card, validate_cpf, CpfValidation};
use chrono::NaiveDate;
use uuid::Uuid;

/// プラン・支払い方法の文字列の解釈
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueParsing {
    /// コード値のみ（API 入力）
    Strict,
    /// 自由記述の同義語も受け付ける（インポート）
    Lenient,
}

fn required<'a>(value: &'a Option<String>, field: &str, errors: &mut Vec<String>) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(format!("{}: Campo obrigatório", field));
            None
        }
    }
}

pub fn check_name(raw: &str) -> Result<String, String> {
    let nome = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if nome.chars().count() < 2 || nome.chars().count() > 150 {
        return Err("nome_aluno: Nome deve ter entre 2 e 150 caracteres".to_string());
    }
    Ok(nome)
}

pub fn check_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(format!("email_aluno: Email inválido ({})", raw.trim()))
    }
}

pub fn check_phone(raw: &str) -> Result<String, String> {
    clean_phone(raw).ok_or_else(|| format!("telefone_aluno: Telefone inválido ({})", raw.trim()))
}

pub fn check_cpf(raw: &str) -> Result<String, String> {
    match validate_cpf(raw) {
        CpfValidation::Valid { cleaned } => Ok(cleaned),
        CpfValidation::Invalid { reason } => {
            Err(format!("cpf_aluno: CPF inválido ({}): {}", raw.trim(), reason))
        }
    }
}

/// 数値セルとして届いた CPF は先頭の 0 が落ちているので 11 桁に戻す
pub fn pad_numeric_cpf(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.len() < 11 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>11}", trimmed)
    } else {
        trimmed.to_string()
    }
}

pub fn check_plan(raw: &str, parsing: ValueParsing) -> Result<PlanTier, String> {
    let parsed = match parsing {
        ValueParsing::Strict => raw.parse().ok(),
        ValueParsing::Lenient => normalize_plan(raw),
    };
    parsed.ok_or_else(|| format!("plano_aluno: Plano inválido ({})", raw.trim()))
}

pub fn check_payment_method(raw: &str, parsing: ValueParsing) -> Result<PaymentMethod, String> {
    let parsed = match parsing {
        ValueParsing::Strict => raw.parse().ok(),
        ValueParsing::Lenient => normalize_payment_method(raw),
    };
    parsed.ok_or_else(|| format!("forma_pagamento: Forma de pagamento inválida ({})", raw.trim()))
}

/// 必須項目・CPF・メール・電話・プラン・支払い方法を検証して正規化する
///
/// `forced_method` を渡した場合は支払い方法の入力を無視する。
/// エラーは `campo: mensagem` 形式ですべて集める。
pub fn validate_student(
    payload: &StudentPayload,
    parsing: ValueParsing,
    forced_method: Option<PaymentMethod>,
) -> Result<ValidatedStudent, Vec<String>> {
    let mut errors = Vec::new();

    let nome = required(&payload.nome_aluno, "nome_aluno", &mut errors);
    let email = required(&payload.email_aluno, "email_aluno", &mut errors);
    let telefone = required(&payload.telefone_aluno, "telefone_aluno", &mut errors);
    let cpf = required(&payload.cpf_aluno, "cpf_aluno", &mut errors);
    let plano = required(&payload.plano_aluno, "plano_aluno", &mut errors);
    let forma = match forced_method {
        Some(_) => None,
        None => required(&payload.forma_pagamento, "forma_pagamento", &mut errors),
    };

    let nome = nome.and_then(|v| check_name(v).map_err(|e| errors.push(e)).ok());
    let cpf = cpf.and_then(|v| {
        let v = match parsing {
            ValueParsing::Strict => v.to_string(),
            ValueParsing::Lenient => pad_numeric_cpf(v),
        };
        check_cpf(&v).map_err(|e| errors.push(e)).ok()
    });
    let email = email.and_then(|v| check_email(v).map_err(|e| errors.push(e)).ok());
    let telefone = telefone.and_then(|v| check_phone(v).map_err(|e| errors.push(e)).ok());
    let plano = plano.and_then(|v| check_plan(v, parsing).map_err(|e| errors.push(e)).ok());
    let forma_pagamento = match forced_method {
        Some(method) => Some(method),
        None => forma.and_then(|v| check_payment_method(v, parsing).map_err(|e| errors.push(e)).ok()),
    };

    match (nome, email, telefone, cpf, plano, forma_pagamento) {
        (Some(nome), Some(email), Some(telefone), Some(cpf), Some(plano), Some(forma_pagamento))
            if errors.is_empty() =>
        {
            Ok(ValidatedStudent {
                nome,
                email,
                telefone,
                cpf,
                plano,
                forma_pagamento,
            })
        }
        _ => Err(errors),
    }
}

/// カード決済に必要な情報を検証する
pub fn validate_card_payload(
    payload: Option<&CardPayload>,
    today: NaiveDate,
) -> AppResult<CardData> {
    let card = payload.ok_or_else(|| {
        AppError::ValidationError(
            "dados_cartao: Dados do cartão são obrigatórios para pagamento com cartão".to_string(),
        )
    })?;

    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    let fields = validate_card(
        &field(&card.nome_titular),
        &field(&card.numero),
        &field(&card.mes_validade),
        &field(&card.ano_validade),
        &field(&card.cvv),
        today,
    )
    .map_err(|e| AppError::ValidationError(format!("dados_cartao: {}", e)))?;

    Ok(CardData {
        holder_name: fields.holder_name,
        number: fields.number,
        expiry_month: fields.expiry_month,
        expiry_year: fields.expiry_year,
        cvv: fields.cvv,
    })
}

/// 会社内の CPF・メール重複を確認する（`exclude_id` は編集対象自身）
pub async fn ensure_unique(
    student_repo: &StudentRepository,
    id_empresa: Uuid,
    cpf: Option<&str>,
    email: Option<&str>,
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(cpf) = cpf {
        if let Some(existing) = student_repo.find_by_cpf(id_empresa, cpf, exclude_id).await? {
            return Err(AppError::ValidationError(format!(
                "CPF {} já cadastrado para o aluno {} (matrícula {})",
                cpf, existing.nome_aluno, existing.matricula_aluno
            )));
        }
    }

    if let Some(email) = email {
        if let Some(existing) = student_repo.find_by_email(id_empresa, email, exclude_id).await? {
            return Err(AppError::ValidationError(format!(
                "Email {} já cadastrado para o aluno {} (matrícula {})",
                email, existing.nome_aluno, existing.matricula_aluno
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> StudentPayload {
        StudentPayload {
            nome_aluno: Some("  Maria   Souza ".to_string()),
            email_aluno: Some("Maria@Example.com".to_string()),
            telefone_aluno: Some("(11) 98765-4321".to_string()),
            cpf_aluno: Some("529.982.247-25".to_string()),
            plano_aluno: Some("mensal".to_string()),
            forma_pagamento: Some("boleto".to_string()),
        }
    }

    #[test]
    fn test_validate_student_normalizes_fields() {
        let student = validate_student(&payload(), ValueParsing::Strict, None).unwrap();

        assert_eq!(student.nome, "Maria Souza");
        assert_eq!(student.email, "maria@example.com");
        assert_eq!(student.telefone, "11987654321");
        assert_eq!(student.cpf, "52998224725");
        assert_eq!(student.plano, PlanTier::Mensal);
        assert_eq!(student.forma_pagamento, PaymentMethod::Boleto);
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let errors = validate_student(&StudentPayload::default(), ValueParsing::Strict, None)
            .unwrap_err();

        for field in [
            "nome_aluno",
            "email_aluno",
            "telefone_aluno",
            "cpf_aluno",
            "plano_aluno",
            "forma_pagamento",
        ] {
            assert!(
                errors.iter().any(|e| e.starts_with(field)),
                "missing {field} in {errors:?}"
            );
        }
    }

    #[test]
    fn test_invalid_cpf_is_quoted_in_error() {
        let mut input = payload();
        input.cpf_aluno = Some("123.456.789-00".to_string());

        let errors = validate_student(&input, ValueParsing::Strict, None).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("123.456.789-00"));
    }

    #[test]
    fn test_lenient_parsing_restores_leading_zeros_of_numeric_cpf() {
        // 012.345.678-90 が数値セルとして届いた場合
        let row: StudentPayload = serde_json::from_value(serde_json::json!({
            "nome_aluno": "Maria Souza",
            "email_aluno": "maria@example.com",
            "telefone_aluno": 11987654321u64,
            "cpf_aluno": 1234567890u64,
            "plano_aluno": "mensal",
            "forma_pagamento": "boleto",
        }))
        .unwrap();
        assert_eq!(row.cpf_aluno.as_deref(), Some("1234567890"));

        let student = validate_student(&row, ValueParsing::Lenient, None).unwrap();
        assert_eq!(student.cpf, "01234567890");

        // API 入力では桁不足のまま拒否する
        assert!(validate_student(&row, ValueParsing::Strict, None).is_err());
    }

    #[test]
    fn test_pad_numeric_cpf_leaves_formatted_input_alone() {
        assert_eq!(pad_numeric_cpf("1234567890"), "01234567890");
        assert_eq!(pad_numeric_cpf(" 52998224725 "), "52998224725");
        assert_eq!(pad_numeric_cpf("012.345.678-90"), "012.345.678-90");
        assert_eq!(pad_numeric_cpf(""), "");
    }

    #[test]
    fn test_strict_parsing_rejects_synonyms_lenient_accepts_them() {
        let mut input = payload();
        input.forma_pagamento = Some("Cartão de Crédito".to_string());
        input.plano_aluno = Some("Monthly".to_string());

        assert!(validate_student(&input, ValueParsing::Strict, None).is_err());

        let student = validate_student(&input, ValueParsing::Lenient, None).unwrap();
        assert_eq!(student.forma_pagamento, PaymentMethod::Credito);
        assert_eq!(student.plano, PlanTier::Mensal);
    }

    #[test]
    fn test_forced_method_ignores_input() {
        let mut input = payload();
        input.forma_pagamento = None;

        let student = validate_student(&input, ValueParsing::Strict, Some(PaymentMethod::Pix))
            .unwrap();
        assert_eq!(student.forma_pagamento, PaymentMethod::Pix);
    }

    #[test]
    fn test_card_payload_required() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(matches!(
            validate_card_payload(None, today),
            Err(AppError::ValidationError(_))
        ));

        let card = CardPayload {
            nome_titular: Some("MARIA SOUZA".to_string()),
            numero: Some("4111 1111 1111 1111".to_string()),
            mes_validade: Some("12".to_string()),
            ano_validade: Some("30".to_string()),
            cvv: Some("123".to_string()),
        };
        let data = validate_card_payload(Some(&card), today).unwrap();
        assert_eq!(data.number, "4111111111111111");
        assert_eq!(data.expiry_year, 2030);
    }
}
