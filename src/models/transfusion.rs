use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[sea_orm(string_value = "regular")]
    Regular,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// Statut d'une transfusion.
///
/// Machine à états explicite, voir `can_transition` : toute transition hors
/// table est refusée (l'ancien comportement acceptait n'importe quelle
/// chaîne, source de données incohérentes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransfusionStatus {
    #[sea_orm(string_value = "scheduled")]
    #[serde(rename = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    #[serde(rename = "completed")]
    Completed,
    #[sea_orm(string_value = "notcompleted")]
    #[serde(rename = "notcompleted")]
    NotCompleted,
    #[sea_orm(string_value = "cancelled")]
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl TransfusionStatus {
    /// Table de transitions autorisées.
    ///
    /// completed ⇄ notcompleted correspond à la case à cocher de la liste
    /// du jour (marquer / dé-marquer), cancelled est terminal et exige un
    /// motif.
    pub fn can_transition(self, to: TransfusionStatus) -> bool {
        use TransfusionStatus::*;

        matches!(
            (self, to),
            (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Completed, NotCompleted)
                | (NotCompleted, Completed)
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfusions")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Code lisible (TRF-XXXXXXXX).
    #[sea_orm(unique)]
    pub code: String,
    pub patient_id: Uuid,

    pub scheduled_date: Date,
    /// Instant planifié, toujours dérivé de scheduled_date + "HH:MM".
    pub scheduled_time: DateTime,
    pub priority: Priority,
    pub blood_units: i32,
    pub status: TransfusionStatus,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub completed_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patient::Entity",
        from = "Column::PatientId",
        to = "super::patient::Column::Id"
    )]
    Patient,
}

impl Related<super::patient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
