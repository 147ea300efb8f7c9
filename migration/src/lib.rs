// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// テナント階層マイグレーション
mod m20250801_000001_create_companies_table;
mod m20250801_000002_create_branches_table;
mod m20250801_000003_create_profiles_table;
mod m20250801_000004_create_users_table;

// 生徒・決済関連マイグレーション
mod m20250801_000005_create_students_table;
mod m20250801_000006_create_transactions_table;

// 監査ログ
mod m20250801_000007_create_audit_logs_table;

// 初期データ
mod m20250801_000008_create_initial_admin;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. テナント階層（依存順）
            Box::new(m20250801_000001_create_companies_table::Migration),
            Box::new(m20250801_000002_create_branches_table::Migration),
            Box::new(m20250801_000003_create_profiles_table::Migration),
            Box::new(m20250801_000004_create_users_table::Migration),
            // 2. 生徒と決済
            Box::new(m20250801_000005_create_students_table::Migration),
            Box::new(m20250801_000006_create_transactions_table::Migration),
            // 3. 監査ログ
            Box::new(m20250801_000007_create_audit_logs_table::Migration),
            // 4. 初期管理者
            Box::new(m20250801_000008_create_initial_admin::Migration),
        ]
    }
}
