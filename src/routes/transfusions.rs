use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::middleware::AuthUser;
use crate::models::dto::{ScheduleTransfusionRequest, SetStatusRequest, TransfusionListQuery};
use crate::permissions::Capability;
use crate::services::transfusion_service::TransfusionService;

/// GET /transfusions - Listing filtré et paginé, patient peuplé
#[get("")]
pub async fn list_transfusions(
    auth_user: AuthUser,
    query: web::Query<TransfusionListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    let page = TransfusionService::list(db.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// POST /transfusions - Planifier une transfusion
/// Crée l'enregistrement et dénormalise le snapshot patient du jour.
#[post("")]
pub async fn schedule_transfusion(
    auth_user: AuthUser,
    body: web::Json<ScheduleTransfusionRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;
    body.validate().map_err(ServiceError::ValidationFields)?;

    let transfusion = TransfusionService::schedule(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(transfusion))
}

/// GET /transfusions/today - Liste opérationnelle du jour
#[get("/today")]
pub async fn today_transfusions(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    let page = TransfusionService::today(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /transfusions/{id}
#[get("/{id}")]
pub async fn get_transfusion(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    let transfusion = TransfusionService::get(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(transfusion))
}

/// PUT /transfusions/{id}/status - Avancer le statut
/// Transitions hors table → 409 ; annulation sans motif → 400.
#[put("/{id}/status")]
pub async fn set_transfusion_status(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<SetStatusRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    let body = body.into_inner();
    let transfusion =
        TransfusionService::set_status(db.get_ref(), path.into_inner(), body.status, body.reason)
            .await?;

    Ok(HttpResponse::Ok().json(transfusion))
}

/// DELETE /transfusions/{id} - Suppression physique
#[delete("/{id}")]
pub async fn delete_transfusion(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanScheduleTransfusions)?;

    TransfusionService::delete(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn transfusion_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transfusions")
            .service(list_transfusions)
            .service(schedule_transfusion)
            .service(today_transfusions)
            .service(set_transfusion_status)
            .service(get_transfusion)
            .service(delete_transfusion),
    );
}
