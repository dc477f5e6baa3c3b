use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateUserRequest, UpdateUserRequest};
use crate::permissions::Role;
use crate::services::user_service::UserService;

// Toutes les routes de gestion des comptes exigent le rôle admin.

/// GET /users
#[get("")]
pub async fn list_users(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require_role(Role::Admin)?;

    let users = UserService::list_users(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(users))
}

/// POST /users - Création d'un compte par un admin
#[post("")]
pub async fn create_user(
    auth_user: AuthUser,
    body: web::Json<CreateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require_role(Role::Admin)?;
    body.validate().map_err(ServiceError::ValidationFields)?;

    let user = UserService::create_user(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(user))
}

/// PUT /users/{id} - Nom, rôle, service, téléphone uniquement
#[put("/{id}")]
pub async fn update_user(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require_role(Role::Admin)?;
    body.validate().map_err(ServiceError::ValidationFields)?;

    let user = UserService::update_user(db.get_ref(), path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /users/{id} - Désactivation (jamais de suppression physique)
/// Refuse toujours la désactivation de son propre compte.
#[delete("/{id}")]
pub async fn deactivate_user(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require_role(Role::Admin)?;

    UserService::deactivate_user(db.get_ref(), auth_user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(list_users)
            .service(create_user)
            .service(update_user)
            .service(deactivate_user),
    );
}
