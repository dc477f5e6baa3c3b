use actix_web::{HttpResponse, delete, get, web};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::middleware::AuthUser;
use crate::permissions::Capability;
use crate::services::history_service::HistoryService;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub date: Option<NaiveDate>,
}

/// GET /history - Entrées du journal, éventuellement filtrées par jour
#[get("")]
pub async fn list_history(
    auth_user: AuthUser,
    query: web::Query<HistoryQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    let entries = HistoryService::list(db.get_ref(), query.date).await?;

    Ok(HttpResponse::Ok().json(entries))
}

/// GET /history/{id}
#[get("/{id}")]
pub async fn get_history(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    let entry = HistoryService::get(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(entry))
}

/// DELETE /history/{id}
#[delete("/{id}")]
pub async fn delete_history(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    HistoryService::delete(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn history_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/history")
            .service(list_history)
            .service(get_history)
            .service(delete_history),
    );
}
