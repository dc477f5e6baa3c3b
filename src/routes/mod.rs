pub mod analytics;
pub mod auth;
pub mod health;
pub mod history;
pub mod patients;
pub mod transfusions;
pub mod users;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .configure(auth::auth_routes)
        .configure(patients::patient_routes)
        .configure(transfusions::transfusion_routes)
        .configure(history::history_routes)
        .configure(users::user_routes)
        .configure(analytics::analytics_routes);
}
