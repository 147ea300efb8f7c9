use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

/// メールアドレス形状チェック用正規表現
pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// CPF 検証結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpfValidation {
    Valid { cleaned: String },
    Invalid { reason: String },
}

impl CpfValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, CpfValidation::Valid { .. })
    }
}

/// 数字以外を取り除く
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn mod11_digit(sum: u32) -> u32 {
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// 先頭 9 桁から CPF の検証桁 2 桁を計算する
pub fn cpf_check_digits(base: &[u32; 9]) -> (u32, u32) {
    let first_sum: u32 = base
        .iter()
        .zip((2..=10).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let first = mod11_digit(first_sum);

    let second_sum: u32 = base
        .iter()
        .chain(std::iter::once(&first))
        .zip((2..=11).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let second = mod11_digit(second_sum);

    (first, second)
}

/// CPF を検証し、数字のみの 11 桁に正規化する
pub fn validate_cpf(input: &str) -> CpfValidation {
    let cleaned = digits_only(input);

    if cleaned.len() != 11 {
        return CpfValidation::Invalid {
            reason: "CPF deve conter 11 dígitos".to_string(),
        };
    }

    let digits: Vec<u32> = cleaned.chars().filter_map(|c| c.to_digit(10)).collect();

    if all_same(&digits) {
        return CpfValidation::Invalid {
            reason: "CPF não pode ter todos os dígitos iguais".to_string(),
        };
    }

    let mut base = [0u32; 9];
    base.copy_from_slice(&digits[..9]);
    let (first, second) = cpf_check_digits(&base);

    if digits[9] != first || digits[10] != second {
        return CpfValidation::Invalid {
            reason: "Dígitos verificadores do CPF não conferem".to_string(),
        };
    }

    CpfValidation::Valid { cleaned }
}

/// メールアドレスの形状チェック
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// 電話番号を数字のみに正規化（DDD 込み 10〜11 桁）
pub fn clean_phone(input: &str) -> Option<String> {
    let cleaned = digits_only(input);
    if (10..=11).contains(&cleaned.len()) {
        Some(cleaned)
    } else {
        None
    }
}

/// CNPJ を検証し、数字のみの 14 桁に正規化する
pub fn clean_cnpj(input: &str) -> Option<String> {
    const FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let cleaned = digits_only(input);
    if cleaned.len() != 14 {
        return None;
    }

    let digits: Vec<u32> = cleaned.chars().filter_map(|c| c.to_digit(10)).collect();
    if all_same(&digits) {
        return None;
    }

    let first = mod11_digit(
        digits[..12]
            .iter()
            .zip(FIRST_WEIGHTS.iter())
            .map(|(d, w)| d * w)
            .sum(),
    );
    let second = mod11_digit(
        digits[..12]
            .iter()
            .chain(std::iter::once(&first))
            .zip(SECOND_WEIGHTS.iter())
            .map(|(d, w)| d * w)
            .sum(),
    );

    if digits[12] == first && digits[13] == second {
        Some(cleaned)
    } else {
        None
    }
}

/// validator 用の CNPJ チェック
pub fn validate_cnpj(cnpj: &str) -> Result<(), ValidationError> {
    if clean_cnpj(cnpj).is_some() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_cnpj");
        error.message = Some(Cow::from("CNPJ inválido"));
        Err(error)
    }
}

/// カード情報の検証（正規化済みの値を返す）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub holder_name: String,
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
}

pub fn validate_card(
    holder_name: &str,
    number: &str,
    month: &str,
    year: &str,
    cvv: &str,
    today: NaiveDate,
) -> Result<CardFields, String> {
    let holder_name = holder_name.trim();
    if holder_name.is_empty() {
        return Err("Nome do titular do cartão é obrigatório".to_string());
    }

    let number = digits_only(number);
    if !(13..=19).contains(&number.len()) {
        return Err("Número do cartão inválido".to_string());
    }

    let expiry_month: u32 = month
        .trim()
        .parse()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| "Mês de validade inválido".to_string())?;

    let year = year.trim();
    let parsed_year: i32 = year
        .parse()
        .map_err(|_| "Ano de validade inválido".to_string())?;
    let expiry_year = match year.len() {
        2 => 2000 + parsed_year,
        4 => parsed_year,
        _ => return Err("Ano de validade inválido".to_string()),
    };

    if (expiry_year, expiry_month) < (today.year(), today.month()) {
        return Err("Cartão vencido".to_string());
    }

    let cvv = cvv.trim();
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err("CVV inválido".to_string());
    }

    Ok(CardFields {
        holder_name: holder_name.to_string(),
        number,
        expiry_month,
        expiry_year,
        cvv: cvv.to_string(),
    })
}
