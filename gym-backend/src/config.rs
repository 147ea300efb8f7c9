// src/config.rs
pub mod app;
pub mod payment;

pub use app::{AppConfig, EnrollmentConfig};
pub use payment::{PaymentConfig, PlanPricing};
