// src/repository/mod.rs
pub mod audit_log_repository;
pub mod branch_repository;
pub mod company_repository;
pub mod profile_repository;
pub mod student_repository;
pub mod transaction_repository;
pub mod user_repository;
