// DTOs des requêtes et réponses API.
// La validation de schéma (validator) se fait ici, au bord du service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::patient::{Gender, PatientCategory};
use crate::models::transfusion::{Priority, TransfusionStatus};
use crate::models::{patient, transfusion, users};
use crate::permissions::{Capability, Role};

/// Valide une heure au format "HH:MM" (ex: "09:00").
fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| ValidationError::new("time_of_day"))
}

// ---------------------------------------------------------------------------
// Utilisateurs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "6 caractères minimum"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    pub role: Role,
    #[validate(length(min = 1))]
    pub department: String,
    pub phone: Option<String>,
}

/// Bootstrap du tout premier admin : pas de rôle dans la requête, pas de
/// session exigée (échoue dès qu'un admin existe).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "6 caractères minimum"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(length(min = 1))]
    pub department: String,
    pub phone: Option<String>,
}

/// Champs modifiables d'un compte. Email et mot de passe sont immuables
/// par cette voie.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    #[validate(length(min = 1))]
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: users::Model,
    pub capabilities: Vec<Capability>,
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,

    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,

    #[validate(length(min = 1))]
    pub blood_type: String,
    pub ph: Option<String>,
    pub weight: Option<f32>,
    pub height: Option<f32>,
    pub hb: Option<f32>,
    #[serde(default)]
    pub has_f: bool,
    #[serde(default)]
    pub has_c: bool,
    #[serde(default)]
    pub has_l: bool,
    #[serde(default)]
    pub poches: i32,
    #[validate(custom(function = validate_time_of_day))]
    pub hdist: Option<String>,
    #[validate(custom(function = validate_time_of_day))]
    pub hrecu: Option<String>,
    pub don: Option<String>,
    pub medical_history: Option<String>,

    pub patient_category: Option<PatientCategory>,
    pub admission_date: Option<NaiveDate>,
    pub last_donation_date: Option<NaiveDate>,
}

/// Mise à jour partielle : seuls les champs présents sont fusionnés dans le
/// dossier existant.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,

    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,

    pub blood_type: Option<String>,
    pub ph: Option<String>,
    pub weight: Option<f32>,
    pub height: Option<f32>,
    pub hb: Option<f32>,
    pub has_f: Option<bool>,
    pub has_c: Option<bool>,
    pub has_l: Option<bool>,
    pub poches: Option<i32>,
    #[validate(custom(function = validate_time_of_day))]
    pub hdist: Option<String>,
    #[validate(custom(function = validate_time_of_day))]
    pub hrecu: Option<String>,
    pub don: Option<String>,
    pub medical_history: Option<String>,

    pub patient_category: Option<PatientCategory>,
    pub admission_date: Option<NaiveDate>,
    pub last_donation_date: Option<NaiveDate>,
}

impl UpdatePatientRequest {
    /// Vrai si la mise à jour touche un champ clinique : dans ce cas un
    /// snapshot du jour est ajouté au journal (daily_history + schedules).
    pub fn touches_clinical(&self) -> bool {
        self.blood_type.is_some()
            || self.ph.is_some()
            || self.weight.is_some()
            || self.height.is_some()
            || self.hb.is_some()
            || self.has_f.is_some()
            || self.has_c.is_some()
            || self.has_l.is_some()
            || self.poches.is_some()
            || self.hdist.is_some()
            || self.hrecu.is_some()
            || self.don.is_some()
    }
}

/// Filtres de listing patients, combinés en AND.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientListQuery {
    /// Recherche insensible à la casse sur nom / téléphone / email / code.
    pub search: Option<String>,
    pub blood_type: Option<String>,
    pub ph: Option<String>,
    pub gender: Option<Gender>,
    pub category: Option<PatientCategory>,
}

// ---------------------------------------------------------------------------
// Transfusions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTransfusionRequest {
    pub patient_id: Uuid,
    pub scheduled_date: NaiveDate,
    /// Heure du rendez-vous, "HH:MM".
    #[validate(custom(function = validate_time_of_day))]
    pub scheduled_time: String,
    pub priority: Priority,
    #[validate(range(min = 1, max = 10))]
    pub blood_units: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: TransfusionStatus,
    /// Obligatoire pour une annulation.
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfusionListQuery {
    /// Jour exact (comparé à scheduled_date).
    pub date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<TransfusionStatus>,
    pub patient_id: Option<Uuid>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Transfusion avec son patient peuplé. Une référence patient manquante
/// donne `patient: null`, la ligne n'est jamais supprimée du résultat.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfusionWithPatient {
    #[serde(flatten)]
    pub transfusion: transfusion::Model,
    pub patient: Option<patient::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedTransfusions {
    pub items: Vec<TransfusionWithPatient>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: PatientCategory,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: TransfusionStatus,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub active_patients: u64,
    pub transfusions_today: u64,
    pub patients_by_category: Vec<CategoryCount>,
    pub today_by_status: Vec<StatusCount>,
}
