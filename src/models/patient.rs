use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
}

/// Régime clinique du patient, utilisé pour le tri d'urgence côté UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PatientCategory {
    #[sea_orm(string_value = "HyperRegime")]
    HyperRegime,
    #[sea_orm(string_value = "PolyTransfuses")]
    PolyTransfuses,
    #[sea_orm(string_value = "Echanges")]
    Echanges,
    #[sea_orm(string_value = "PDV")]
    #[serde(rename = "PDV")]
    Pdv,
    #[sea_orm(string_value = "Echanges Occasionnels")]
    #[serde(rename = "Echanges Occasionnels")]
    EchangesOccasionnels,
}

/// Dossier patient.
///
/// `schedules` est l'historique embarqué des passages (copies dénormalisées
/// des champs cliniques au moment de chaque transfusion) ; la table
/// daily_history porte la même information regroupée par jour.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "patients")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Code lisible (PAT-XXXXXXXX), montré au personnel.
    #[sea_orm(unique)]
    pub code: String,

    // Identité
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub gender: Gender,

    // Contact
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,

    // Données cliniques
    pub blood_type: String,
    /// Phénotype érythrocytaire (ex: "cceek+")
    pub ph: Option<String>,
    pub weight: Option<f32>,
    pub height: Option<f32>,
    /// Taux d'hémoglobine (g/dL)
    pub hb: Option<f32>,
    pub has_f: bool,
    pub has_c: bool,
    pub has_l: bool,
    /// Nombre de poches de sang
    pub poches: i32,
    /// Heure de distribution du produit sanguin ("HH:MM")
    pub hdist: Option<String>,
    /// Heure de réception du produit sanguin ("HH:MM")
    pub hrecu: Option<String>,
    pub don: Option<String>,
    pub medical_history: Option<String>,

    pub patient_category: Option<PatientCategory>,
    pub admission_date: Option<Date>,
    pub last_donation_date: Option<Date>,

    pub status: PatientStatus,
    /// Historique embarqué des passages (tableau JSON de snapshots).
    pub schedules: Json,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfusion::Entity")]
    Transfusion,
}

impl Related<super::transfusion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transfusion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
