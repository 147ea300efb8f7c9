use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// JSON ボディの Extractor
///
/// 解析エラーを `validacao_erro` として返す（axum 標準のテキスト応答にしない）。
#[derive(Debug, Clone)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Content-Type deve ser application/json".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "JSON malformado".to_string(),
        JsonRejection::JsonDataError(e) => format!("Dados inválidos: {}", e.body_text()),
        _ => "Corpo da requisição inválido".to_string(),
    };
    tracing::debug!(error = %rejection, "Rejected JSON body");
    AppError::ValidationError(message)
}
