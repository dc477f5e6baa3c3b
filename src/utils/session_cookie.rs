use actix_web::cookie::{Cookie, SameSite, time::Duration};
use std::env;
use uuid::Uuid;

use crate::permissions::Role;
use crate::utils::jwt::{self, SESSION_TTL_HOURS};

/// Nom du cookie de session. Le cookie EST la session : aucun état côté
/// serveur, la validité repose sur la signature et l'expiration du token.
pub const SESSION_COOKIE: &str = "session";

fn is_production() -> bool {
    env::var("APP_ENV").map(|v| v == "production").unwrap_or(false)
}

/// Émet le cookie de session pour un utilisateur authentifié
/// (HttpOnly, SameSite=Lax, path /, secure en production, 24h).
pub fn issue(user_id: Uuid, email: &str, role: Role) -> Result<Cookie<'static>, String> {
    let token = jwt::generate_token(user_id, email, role)?;

    Ok(Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(is_production())
        .max_age(Duration::hours(SESSION_TTL_HOURS))
        .finish())
}

/// Cookie d'expiration immédiate pour la déconnexion.
/// Idempotent : supprimer un cookie absent n'est pas une erreur.
pub fn revoke() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(is_production())
        .max_age(Duration::ZERO)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_cookie_attributes() {
        let cookie = issue(Uuid::new_v4(), "a@b.fr", Role::Doctor).unwrap();
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
        assert!(!cookie.value().is_empty());
    }

    #[test]
    fn test_revoke_expires_cookie() {
        let cookie = revoke();
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
