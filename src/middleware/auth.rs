use actix_web::{Error, FromRequest, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::permissions::{self, Capability, Role};
use crate::utils::jwt;
use crate::utils::session_cookie::SESSION_COOKIE;

/// Session vérifiée, extraite du cookie signé.
/// Utilisée comme extracteur dans toutes les routes protégées : une session
/// absente ou invalide répond 401 avant toute logique du handler.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// 403 si le rôle de la session n'atteint pas le rang requis.
    pub fn require_role(&self, required: Role) -> Result<(), ServiceError> {
        if self.role.meets(required) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    /// 403 si le rôle ne porte pas la capacité demandée.
    pub fn require(&self, capability: Capability) -> Result<(), ServiceError> {
        if permissions::has_capability(self.role, capability) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Le cookie EST la session : signature + expiration font foi,
        // tout échec de décodage est traité comme "pas de session".
        let claims = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| jwt::verify_token(cookie.value()).ok());

        ready(match claims {
            Some(claims) => Ok(AuthUser {
                user_id: claims.sub,
                email: claims.email,
                role: claims.role,
            }),
            None => Err(ServiceError::Unauthorized.into()),
        })
    }
}
