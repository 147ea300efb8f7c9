// gym-backend/src/utils/error_helper.rs

//! サービス層とハンドラー層で共通して使うエラー生成ヘルパー

use crate::error::AppError;
use tracing::{error, warn};
use validator::ValidationErrors;

/// validator の ValidationErrors を `campo: mensagem` 形式の一覧に変換
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    warn!(
        context = %context,
        error_count = validation_errors.field_errors().len(),
        "Validation failed"
    );

    let mut errors: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| "Valor inválido".to_string(), |cow| cow.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    errors.sort();

    AppError::ValidationErrors(errors)
}

/// 内部サーバーエラーをログ付きで生成
pub fn internal_server_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
) -> AppError {
    error!(
        error = %error,
        context = %context,
        "Internal server error occurred"
    );
    AppError::InternalServerError(user_message.to_string())
}

/// リソース未発見エラーをログ付きで生成
pub fn not_found_error(resource: &str, identifier: &str, context: &str) -> AppError {
    warn!(
        context = %context,
        resource = %resource,
        identifier = %identifier,
        "Resource not found"
    );
    AppError::NotFound(format!("{} não encontrado(a)", resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Mínimo de 3 caracteres"))]
        nome: String,
        #[validate(email(message = "Email inválido"))]
        email: String,
    }

    #[test]
    fn test_convert_validation_errors() {
        let sample = Sample {
            nome: "Al".to_string(),
            email: "sem-arroba".to_string(),
        };
        let err = convert_validation_errors(sample.validate().unwrap_err(), "test");

        match err {
            AppError::ValidationErrors(errors) => {
                assert_eq!(
                    errors,
                    vec![
                        "email: Email inválido".to_string(),
                        "nome: Mínimo de 3 caracteres".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
