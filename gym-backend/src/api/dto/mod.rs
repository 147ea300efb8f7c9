// src/api/dto/mod.rs
pub mod auth_dto;
pub mod import_dto;
pub mod student_dto;
pub mod tenant_dto;
