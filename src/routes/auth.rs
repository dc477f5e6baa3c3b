use actix_web::{HttpResponse, get, post, web};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Deserialize;
use validator::Validate;

use crate::errors::ServiceError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateAdminRequest, CreateUserRequest, MeResponse};
use crate::permissions::capabilities_for;
use crate::services::user_service::UserService;
use crate::utils::session_cookie;

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Se connecter (PUBLIC)
/// Pose le cookie de session ; 401 sur identifiants invalides.
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let user = UserService::authenticate(db.get_ref(), &body.email, &body.password).await?;

    let cookie = session_cookie::issue(user.id, &user.email, user.role)
        .map_err(|e| ServiceError::Database(DbErr::Custom(e)))?;

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(serde_json::json!({ "user": user })))
}

/// POST /auth/logout - Se déconnecter (PUBLIC)
/// Supprime le cookie ; idempotent, déconnecter sans session n'échoue pas.
#[post("/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(session_cookie::revoke())
        .json(serde_json::json!({}))
}

/// GET /auth/me - Session courante (PROTÉGÉE)
/// Renvoie l'utilisateur et ses capacités (table unique, jamais dupliquée
/// côté client).
#[get("/me")]
pub async fn me(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    // Compte supprimé ou désactivé après émission du cookie : session
    // invalide, jamais 404
    let user = UserService::current_user(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(MeResponse {
        capabilities: capabilities_for(user.role).to_vec(),
        user,
    }))
}

/// POST /auth/register - Créer un compte (PUBLIC)
/// Ne peut jamais créer d'admin ; voir /auth/create-admin.
#[post("/register")]
pub async fn register(
    body: web::Json<CreateUserRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    body.validate().map_err(ServiceError::ValidationFields)?;

    let user = UserService::register_user(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "user": user })))
}

/// POST /auth/create-admin - Bootstrap du premier admin (PUBLIC)
/// Seule voie de création sans session existante ; refuse dès qu'un admin
/// existe.
#[post("/create-admin")]
pub async fn create_admin(
    body: web::Json<CreateAdminRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    body.validate().map_err(ServiceError::ValidationFields)?;

    let user = UserService::create_admin(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "user": user })))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(logout)
            .service(me)
            .service(register)
            .service(create_admin),
    );
}
