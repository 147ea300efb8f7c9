// src/api/handlers/mod.rs
pub mod admin_handler;
pub mod auth_handler;
pub mod enrollment_handler;
pub mod student_handler;
pub mod system_handler;
