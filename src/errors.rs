use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

/// Erreurs de service, traduites en réponses HTTP par `ResponseError`.
///
/// Les erreurs base de données sont loggées côté serveur avec leur détail,
/// le client ne reçoit qu'un message générique.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Authentification requise")]
    Unauthorized,

    #[error("Accès refusé")]
    Forbidden,

    #[error("{0} introuvable")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Données invalides")]
    ValidationFields(ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("Impossible de désactiver son propre compte")]
    SelfDeactivation,

    #[error("Erreur interne du serveur")]
    Database(#[from] DbErr),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) | ServiceError::ValidationFields(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::SelfDeactivation => StatusCode::BAD_REQUEST,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Détail par champ pour les erreurs de validation
            ServiceError::ValidationFields(errors) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Données invalides",
                    "fields": errors,
                }))
            }
            ServiceError::Database(e) => {
                log::error!("database error: {e}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Erreur interne du serveur"
                }))
            }
            other => HttpResponse::build(self.status_code()).json(serde_json::json!({
                "error": other.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ServiceError::NotFound("Patient").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::Conflict("déjà existant".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::SelfDeactivation.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_database_error_hides_detail() {
        let err = ServiceError::Database(DbErr::Custom("mot de passe du serveur".into()));
        assert_eq!(err.to_string(), "Erreur interne du serveur");
    }
}
