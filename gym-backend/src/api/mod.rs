// gym-backend/src/api/mod.rs
use crate::config::AppConfig;
use crate::gateway::PaymentGateway;
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{jwt_auth_middleware, AuthMiddlewareConfig};
use crate::repository::{
    audit_log_repository::AuditLogRepository, branch_repository::BranchRepository,
    company_repository::CompanyRepository, profile_repository::ProfileRepository,
    student_repository::StudentRepository, transaction_repository::TransactionRepository,
    user_repository::UserRepository,
};
use crate::service::{
    audit_log_service::AuditLogService, auth_service::AuthService,
    enrollment_service::EnrollmentService, import_service::ImportService,
    matricula_allocator::MatriculaAllocator, payment_service::PaymentService,
    student_service::StudentService, tenant_service::TenantService,
};
use crate::utils::jwt::JwtManager;
use crate::utils::password::PasswordManager;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub mod dto;
pub mod handlers;

/// リクエストボディの上限（一括インポートを考慮）
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub import_service: Arc<ImportService>,
    pub student_service: Arc<StudentService>,
    pub tenant_service: Arc<TenantService>,
    pub payment_service: Arc<PaymentService>,
    pub jwt_manager: Arc<JwtManager>,
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// リポジトリとサービスを組み立てる
    pub fn new(
        db: DatabaseConnection,
        app_config: &AppConfig,
        gateway: Arc<dyn PaymentGateway>,
        password_manager: Arc<PasswordManager>,
    ) -> Result<Self, String> {
        let jwt_manager = Arc::new(JwtManager::new(app_config.jwt.clone()).map_err(|e| e.to_string())?);

        let company_repo = Arc::new(CompanyRepository::new(db.clone()));
        let branch_repo = Arc::new(BranchRepository::new(db.clone()));
        let profile_repo = Arc::new(ProfileRepository::new(db.clone()));
        let user_repo = Arc::new(UserRepository::new(db.clone()));
        let student_repo = Arc::new(StudentRepository::new(db.clone()));
        let transaction_repo = Arc::new(TransactionRepository::new(db.clone()));
        let audit_log_repo = Arc::new(AuditLogRepository::new(db.clone()));

        let audit_log_service = Arc::new(AuditLogService::new(audit_log_repo));
        let payment_service = Arc::new(PaymentService::new(gateway, app_config.payment.clone()));
        let max_attempts = app_config.enrollment.matricula_max_attempts;

        let auth_service = Arc::new(AuthService::new(
            user_repo.clone(),
            profile_repo.clone(),
            branch_repo.clone(),
            company_repo.clone(),
            password_manager.clone(),
            jwt_manager.clone(),
        ));
        let enrollment_service = Arc::new(EnrollmentService::new(
            db.clone(),
            student_repo.clone(),
            transaction_repo,
            payment_service.clone(),
            MatriculaAllocator::new(max_attempts),
        ));
        let import_service = Arc::new(ImportService::new(
            db.clone(),
            student_repo.clone(),
            audit_log_service.clone(),
            MatriculaAllocator::new(max_attempts),
            app_config.enrollment.import_max_rows,
        ));
        let student_service = Arc::new(StudentService::new(
            student_repo,
            audit_log_service.clone(),
        ));
        let tenant_service = Arc::new(TenantService::new(
            company_repo,
            branch_repo,
            profile_repo,
            user_repo,
            password_manager,
            audit_log_service,
        ));

        Ok(Self {
            auth_service,
            enrollment_service,
            import_service,
            student_service,
            tenant_service,
            payment_service,
            jwt_manager,
            db: Arc::new(db),
            config: Arc::new(app_config.clone()),
        })
    }
}

/// CORS 設定（許可オリジンは設定から）
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true) // Cookie送信を許可
        .max_age(Duration::from_secs(3600))
}

/// 全ルートを結合する
pub fn create_app_router(app_state: AppState) -> Router {
    let auth_config = AuthMiddlewareConfig::new(app_state.jwt_manager.clone());

    let protected = Router::new()
        .merge(handlers::enrollment_handler::enrollment_router(app_state.clone()))
        .merge(handlers::student_handler::student_router(app_state.clone()))
        .merge(handlers::admin_handler::admin_router(app_state.clone()))
        .route_layer(from_fn_with_state(auth_config, jwt_auth_middleware));

    Router::new()
        .merge(handlers::system_handler::system_router(app_state.clone()))
        .merge(handlers::auth_handler::auth_router(app_state.clone()))
        .merge(protected)
        .layer(from_fn(logging_middleware))
        .layer(from_fn(inject_request_context))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors_layer(&app_state.config.cors_allowed_origins))
}
