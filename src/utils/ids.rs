use uuid::Uuid;

/// Code patient lisible (ex: PAT-9F3A27C1), dérivé d'un UUID v4 plutôt que
/// de l'horloge pour éviter les collisions en création concurrente.
pub fn patient_code() -> String {
    format!("PAT-{}", short_hex())
}

/// Code transfusion lisible (ex: TRF-4B0C81D9).
pub fn transfusion_code() -> String {
    format!("TRF-{}", short_hex())
}

fn short_hex() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_format() {
        let code = patient_code();
        assert_eq!(code.len(), 12);
        assert!(code.starts_with("PAT-"));
        assert!(code[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        assert!(transfusion_code().starts_with("TRF-"));
    }

    #[test]
    fn test_codes_differ() {
        assert_ne!(patient_code(), patient_code());
    }
}
