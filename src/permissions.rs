// ============================================================================
// PERMISSIONS - RÔLES ET CAPACITÉS
// ============================================================================
//
// Table unique rôle → capacités, utilisée à la fois par le gate serveur
// (middleware/auth.rs) et renvoyée au client via GET /auth/me.
// Ne jamais dupliquer cette table côté UI : la copie client est purement
// cosmétique, l'application de la règle se fait toujours ici.
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rôles, totalement ordonnés : admin(3) > doctor(2) > assistant(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "doctor")]
    Doctor,
    #[sea_orm(string_value = "assistant")]
    Assistant,
}

impl Role {
    fn rank(self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Doctor => 2,
            Role::Assistant => 1,
        }
    }

    /// Vérifie que ce rôle atteint au moins le rang du rôle requis.
    pub fn meets(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    CanManageUsers,
    CanManagePatients,
    CanScheduleTransfusions,
    CanViewAnalytics,
    CanViewReports,
    CanExportData,
    CanManageSettings,
}

/// Capacités accordées à chaque rôle (table statique, source de vérité unique).
pub fn capabilities_for(role: Role) -> &'static [Capability] {
    use Capability::*;

    match role {
        Role::Admin => &[
            CanManageUsers,
            CanManagePatients,
            CanScheduleTransfusions,
            CanViewAnalytics,
            CanViewReports,
            CanExportData,
            CanManageSettings,
        ],
        Role::Doctor => &[
            CanManagePatients,
            CanScheduleTransfusions,
            CanViewAnalytics,
            CanViewReports,
            CanExportData,
        ],
        Role::Assistant => &[CanManagePatients, CanScheduleTransfusions],
    }
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities_for(role).contains(&capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_is_reflexive() {
        for role in [Role::Admin, Role::Doctor, Role::Assistant] {
            assert!(role.meets(role));
        }
    }

    #[test]
    fn test_role_ordering() {
        assert!(!Role::Assistant.meets(Role::Admin));
        assert!(Role::Admin.meets(Role::Assistant));
        assert!(Role::Doctor.meets(Role::Assistant));
        assert!(!Role::Doctor.meets(Role::Admin));
    }

    #[test]
    fn test_admin_has_all_capabilities() {
        assert_eq!(capabilities_for(Role::Admin).len(), 7);
    }

    #[test]
    fn test_doctor_cannot_manage_users_or_settings() {
        assert!(!has_capability(Role::Doctor, Capability::CanManageUsers));
        assert!(!has_capability(Role::Doctor, Capability::CanManageSettings));
        assert!(has_capability(Role::Doctor, Capability::CanViewAnalytics));
    }

    #[test]
    fn test_assistant_capabilities() {
        assert_eq!(
            capabilities_for(Role::Assistant),
            &[Capability::CanManagePatients, Capability::CanScheduleTransfusions]
        );
        assert!(!has_capability(Role::Assistant, Capability::CanExportData));
    }
}
