pub mod analytics_service;
pub mod history_service;
pub mod patient_service;
pub mod transfusion_service;
pub mod user_service;
