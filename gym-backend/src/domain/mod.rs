// src/domain/mod.rs
pub mod actor;
pub mod audit_log_model;
pub mod branch_model;
pub mod company_model;
pub mod payment_method;
pub mod permission;
pub mod plan;
pub mod profile_model;
pub mod student_model;
pub mod transaction_model;
pub mod user_model;
