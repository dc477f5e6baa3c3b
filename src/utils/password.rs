use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;

/// Hash un mot de passe avec PBKDF2-HMAC-SHA256
/// (260000 itérations, salt aléatoire de 16 bytes)
///
/// Format produit: pbkdf2:sha256:iterations$salt$hash
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", ITERATIONS, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash stocké.
///
/// Un hash mal formé renvoie `false`, jamais d'erreur : l'appelant traite
/// tous les échecs comme "mot de passe invalide".
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Some((iterations, salt, expected_hash)) = parse_stored_hash(stored_hash) else {
        return false;
    };

    let mut computed = vec![0u8; expected_hash.len()];
    if pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed).is_err() {
        return false;
    }

    computed == expected_hash
}

/// Parse le format pbkdf2:sha256:iterations$salt$hash
fn parse_stored_hash(stored_hash: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return None;
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return None;
    }

    let iterations = header_parts[2].parse::<u32>().ok()?;
    let salt = URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let hash = URL_SAFE_NO_PAD.decode(parts[2]).ok()?;

    Some((iterations, salt, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("motdepasse123").unwrap();
        assert!(hash.starts_with("pbkdf2:sha256:260000$"));
        assert!(verify_password("motdepasse123", &hash));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("motdepasse123").unwrap();
        assert!(!verify_password("autremotdepasse", &hash));
    }

    #[test]
    fn test_malformed_hash_returns_false() {
        assert!(!verify_password("motdepasse123", ""));
        assert!(!verify_password("motdepasse123", "pas-un-hash"));
        assert!(!verify_password("motdepasse123", "pbkdf2:sha256:abc$xx$yy"));
        assert!(!verify_password("motdepasse123", "bcrypt:12$salt$hash"));
    }

    #[test]
    fn test_salts_are_random() {
        let h1 = hash_password("x").unwrap();
        let h2 = hash_password("x").unwrap();
        assert_ne!(h1, h2);
    }
}
