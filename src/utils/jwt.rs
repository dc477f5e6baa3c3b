use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::permissions::Role;

/// Durée de validité d'une session : 24 heures.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Payload de session embarqué dans le cookie signé.
///
/// `exp` est la revendication faisant autorité pour la validité du token ;
/// `expires_at` est portée pour l'affichage et la logique métier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub exp: i64,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session expirée")]
    Expired,
    #[error("session invalide")]
    Invalid,
}

/// Récupère la clé secrète depuis les variables d'environnement
fn get_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        log::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
        "default-insecure-key-change-this".to_string()
    })
}

/// Génère un token de session signé pour un utilisateur
pub fn generate_token(user_id: Uuid, email: &str, role: Role) -> Result<String, String> {
    let expires_at = Utc::now()
        .checked_add_signed(Duration::hours(SESSION_TTL_HOURS))
        .ok_or("Failed to calculate expiration")?;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        expires_at,
        exp: expires_at.timestamp(),
    };

    let secret = get_jwt_secret();

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

/// Vérifie et décode un token de session.
///
/// Toute anomalie de structure ou de signature est traitée comme "pas de
/// session" (fail closed). Aucune tolérance d'horloge : un token expiré
/// d'une seconde est refusé.
pub fn verify_token(token: &str) -> Result<Claims, SessionError> {
    let secret = get_jwt_secret();

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let user_id = Uuid::new_v4();

        let token = generate_token(user_id, "medecin@hopital.fr", Role::Doctor).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "medecin@hopital.fr");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.exp, claims.expires_at.timestamp());
    }

    #[test]
    fn test_round_trip_is_exact() {
        let token = generate_token(Uuid::new_v4(), "a@b.fr", Role::Assistant).unwrap();
        let first = verify_token(&token).unwrap();
        let second = verify_token(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(verify_token("invalid.token.here"), Err(SessionError::Invalid));
    }

    #[test]
    fn test_tampered_token() {
        let token = generate_token(Uuid::new_v4(), "a@b.fr", Role::Admin).unwrap();
        // Remplace le dernier caractère de la signature par un caractère
        // garanti différent
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_ne!(tampered, token);
        assert!(verify_token(&tampered).is_err());
    }

    #[test]
    fn test_expired_token() {
        // Token expiré d'une seconde, signé avec la même clé
        let expires_at = Utc::now() - Duration::seconds(1);
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@b.fr".to_string(),
            role: Role::Admin,
            expires_at,
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(get_jwt_secret().as_ref()),
        )
        .unwrap();

        assert_eq!(verify_token(&token), Err(SessionError::Expired));
    }
}
