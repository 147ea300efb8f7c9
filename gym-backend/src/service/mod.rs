// src/service/mod.rs
pub mod audit_log_service;
pub mod auth_service;
pub mod enrollment_service;
pub mod import_service;
pub mod matricula_allocator;
pub mod payment_service;
pub mod student_checks;
pub mod student_service;
pub mod tenant_service;
