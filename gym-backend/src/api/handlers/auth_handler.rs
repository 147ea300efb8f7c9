// gym-backend/src/api/handlers/auth_handler.rs

use crate::api::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::AppJson;
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::types::ApiResponse;
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// ログイン（トークンはボディと Cookie の両方で返す）
pub async fn login_handler(
    State(app_state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<LoginResponse>>)> {
    let response = app_state.auth_service.login(payload).await?;

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, response.access_token.clone()))
        .path("/")
        .secure(app_state.config.is_production())
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();

    Ok((
        jar.add(cookie),
        Json(ApiResponse::success("Login realizado com sucesso", response)),
    ))
}

pub fn auth_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .with_state(app_state)
}
