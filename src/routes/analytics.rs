use actix_web::{HttpResponse, get, web};
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;
use crate::middleware::AuthUser;
use crate::permissions::Capability;
use crate::services::analytics_service::AnalyticsService;

/// GET /analytics/summary - Compteurs du tableau de bord
#[get("/summary")]
pub async fn summary(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanViewAnalytics)?;

    let summary = AnalyticsService::summary(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(summary))
}

pub fn analytics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/analytics").service(summary));
}
