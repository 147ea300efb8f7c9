// src/main.rs
use gym_backend::api::{create_app_router, AppState};
use gym_backend::config::AppConfig;
use gym_backend::db::create_db_pool;
use gym_backend::gateway::{DevelopmentPaymentGateway, HttpPaymentGateway, PaymentGateway};
use gym_backend::logging::init_tracing;
use gym_backend::utils::password::PasswordManager;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env があれば読み込む
    dotenvy::dotenv().ok();

    // トレーシングの設定
    init_tracing();

    tracing::info!("Starting Gym Backend server...");

    // 設定を読み込む
    let app_config = AppConfig::from_env().expect("Failed to load configuration");
    tracing::info!(
        environment = %app_config.environment,
        payment_development_mode = app_config.payment.development_mode,
        "Configuration loaded"
    );

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created successfully.");

    Migrator::up(&db_pool, None)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied.");

    // 決済ゲートウェイの選択
    let gateway: Arc<dyn PaymentGateway> = if app_config.payment.development_mode {
        tracing::warn!("Payment gateway running in development mode; charges are simulated");
        Arc::new(DevelopmentPaymentGateway::new())
    } else {
        Arc::new(
            HttpPaymentGateway::new(&app_config.payment)
                .expect("Failed to create payment gateway client"),
        )
    };

    let password_manager =
        Arc::new(PasswordManager::from_env().expect("Failed to create password manager"));

    let app_state = AppState::new(db_pool, &app_config, gateway, password_manager)
        .expect("Failed to build application state");

    // ルーターの設定
    let app_router = create_app_router(app_state);

    // サーバーの起動
    let server_addr = format!("{}:{}", app_config.host, app_config.port);
    tracing::info!("Router configured. Server listening on {}", server_addr);

    let listener = TcpListener::bind(&server_addr).await?;
    axum::serve(listener, app_router.into_make_service()).await?;

    Ok(())
}
