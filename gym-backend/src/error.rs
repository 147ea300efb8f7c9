// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// ゲートウェイ呼び出しの失敗（メッセージは利用者向けに翻訳済み）
    #[error("Payment error: {0}")]
    PaymentError(String),

    /// カード決済がゲートウェイに拒否された
    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// レスポンスの `tipo` フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Payment,
    PaymentRejected,
    Database,
    Server,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validacao_erro",
            ErrorKind::Payment => "pagamento_erro",
            ErrorKind::PaymentRejected => "pagamento_rejeitado",
            ErrorKind::Database => "database_erro",
            ErrorKind::Server => "server_erro",
            ErrorKind::Unauthorized => "nao_autorizado",
            ErrorKind::Forbidden => "acesso_negado",
            ErrorKind::NotFound => "nao_encontrado",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::DbErr(DbErr::RecordNotFound(_)) | AppError::NotFound(_) => {
                ErrorKind::NotFound
            }
            AppError::DbErr(_) => ErrorKind::Database,
            AppError::ValidationError(_)
            | AppError::ValidationErrors(_)
            | AppError::ValidationFailure(_) => ErrorKind::Validation,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::PaymentError(_) => ErrorKind::Payment,
            AppError::PaymentRejected(_) => ErrorKind::PaymentRejected,
            AppError::InternalServerError(_) => ErrorKind::Server,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::PaymentRejected => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Payment | ErrorKind::Database | ErrorKind::Server => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let tipo = self.kind().as_str().to_string();

        let error_response = match self {
            AppError::DbErr(db_err) => {
                // サーバーログには詳細を出す
                tracing::error!(error = ?db_err, "Database error");

                let message = match &db_err {
                    DbErr::RecordNotFound(_) => "Registro não encontrado".to_string(),
                    _ => "Erro ao acessar o banco de dados".to_string(),
                };

                ErrorResponse::new(message, tipo)
            }
            AppError::NotFound(message)
            | AppError::ValidationError(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::PaymentRejected(message) => ErrorResponse::new(message, tipo),
            AppError::ValidationErrors(errors) => {
                let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
                for error in &errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_default()
                            .push(message.to_string());
                    }
                }
                ErrorResponse::new(errors.join("; "), tipo).with_details(json!({
                    "campos": field_errors,
                    "erros": errors,
                }))
            }
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Valor inválido".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                ErrorResponse::new("Dados inválidos".to_string(), tipo)
                    .with_details(json!({ "campos": field_errors }))
            }
            AppError::PaymentError(message) => {
                tracing::error!(error = %message, "Payment gateway error");
                ErrorResponse::new(message, tipo)
            }
            AppError::InternalServerError(message) => {
                tracing::error!(error = %message, "Internal server error");
                ErrorResponse::new("Erro interno do servidor".to_string(), tipo)
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub tipo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalhes: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(message: String, tipo: String) -> Self {
        Self {
            success: false,
            message,
            tipo,
            detalhes: None,
        }
    }

    pub fn with_details(mut self, detalhes: serde_json::Value) -> Self {
        self.detalhes = Some(detalhes);
        self
    }
}
