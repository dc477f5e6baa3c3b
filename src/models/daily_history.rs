use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::transfusion::Priority;

/// Journal dénormalisé par jour calendaire : une ligne par jour, portant un
/// tableau JSON de snapshots patients. Projection de reporting uniquement,
/// Patient et Transfusion restent la source de vérité.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_history")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub day: Date,
    /// Tableau de `Snapshot`, append-only : les entrées passées ne sont
    /// jamais réécrites.
    pub entries: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Copie des champs cliniques d'un patient au moment d'un événement
/// (planification de transfusion ou édition clinique du jour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub name: String,
    /// Absente quand le snapshot vient d'une édition clinique sans
    /// transfusion associée.
    pub priority: Option<Priority>,
    pub blood_type: String,
    pub ph: Option<String>,
    pub hb: Option<f32>,
    pub poches: i32,
    pub has_f: bool,
    pub has_c: bool,
    pub has_l: bool,
    pub don: Option<String>,
    pub hdist: Option<String>,
    pub hrecu: Option<String>,
    /// Heure de l'événement ("HH:MM").
    pub time: String,
}
