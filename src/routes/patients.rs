use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreatePatientRequest, PatientListQuery, UpdatePatientRequest};
use crate::models::patient::{self, Gender, PatientCategory};
use crate::permissions::Capability;
use crate::services::patient_service::PatientService;

/// GET /patients - Listing filtré (session requise)
#[get("")]
pub async fn list_patients(
    _auth_user: AuthUser,
    query: web::Query<PatientListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let patients = PatientService::list_patients(db.get_ref(), &query).await?;

    Ok(HttpResponse::Ok().json(patients))
}

/// POST /patients - Créer un dossier
#[post("")]
pub async fn create_patient(
    auth_user: AuthUser,
    body: web::Json<CreatePatientRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanManagePatients)?;
    body.validate().map_err(ServiceError::ValidationFields)?;

    let patient = PatientService::create_patient(db.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(patient))
}

/// GET /patients/export - Export CSV des dossiers actifs
/// Mêmes filtres que le listing ; fichier patients-<date ISO>.csv.
#[get("/export")]
pub async fn export_patients(
    auth_user: AuthUser,
    query: web::Query<PatientListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanExportData)?;

    let patients = PatientService::list_patients(db.get_ref(), &query).await?;
    let csv = patients_csv(&patients);
    let filename = format!("patients-{}.csv", chrono::Local::now().date_naive());

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(csv))
}

/// GET /patients/{id} - Lecture directe (renvoie aussi les supprimés)
#[get("/{id}")]
pub async fn get_patient(
    _auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    let patient = PatientService::get_patient(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(patient))
}

/// PUT /patients/{id} - Mise à jour partielle
#[put("/{id}")]
pub async fn update_patient(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePatientRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanManagePatients)?;
    body.validate().map_err(ServiceError::ValidationFields)?;

    let patient =
        PatientService::update_patient(db.get_ref(), path.into_inner(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(patient))
}

/// DELETE /patients/{id} - Suppression logique
#[delete("/{id}")]
pub async fn delete_patient(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ServiceError> {
    auth_user.require(Capability::CanManagePatients)?;

    PatientService::soft_delete_patient(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Tous les champs sont systématiquement entre guillemets, guillemets
/// internes doublés.
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "M",
        Gender::Female => "F",
    }
}

fn category_label(category: PatientCategory) -> &'static str {
    match category {
        PatientCategory::HyperRegime => "HyperRegime",
        PatientCategory::PolyTransfuses => "PolyTransfuses",
        PatientCategory::Echanges => "Echanges",
        PatientCategory::Pdv => "PDV",
        PatientCategory::EchangesOccasionnels => "Echanges Occasionnels",
    }
}

fn patients_csv(patients: &[patient::Model]) -> String {
    let header = [
        "Code", "Nom", "Prénom", "Date de naissance", "Sexe", "Téléphone", "Email",
        "Groupe sanguin", "Phénotype", "Catégorie", "Poches", "Hb", "Date d'admission",
        "Dernier don",
    ]
    .map(csv_field)
    .join(",");

    let mut lines = vec![header];
    for p in patients {
        let fields = [
            p.code.clone(),
            p.last_name.clone(),
            p.first_name.clone(),
            p.date_of_birth.to_string(),
            gender_label(p.gender).to_string(),
            p.phone.clone(),
            p.email.clone().unwrap_or_default(),
            p.blood_type.clone(),
            p.ph.clone().unwrap_or_default(),
            p.patient_category.map(category_label).unwrap_or_default().to_string(),
            p.poches.to_string(),
            p.hb.map(|v| v.to_string()).unwrap_or_default(),
            p.admission_date.map(|d| d.to_string()).unwrap_or_default(),
            p.last_donation_date.map(|d| d.to_string()).unwrap_or_default(),
        ];
        lines.push(fields.map(|f| csv_field(&f)).join(","));
    }

    lines.join("\r\n")
}

pub fn patient_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/patients")
            .service(list_patients)
            .service(create_patient)
            .service(export_patients)
            .service(get_patient)
            .service(update_patient)
            .service(delete_patient),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("O+"), "\"O+\"");
        assert_eq!(csv_field("dit \"Toto\""), "\"dit \"\"Toto\"\"\"");
        assert_eq!(csv_field(""), "\"\"");
    }

    #[test]
    fn test_csv_header_row() {
        let csv = patients_csv(&[]);
        assert!(csv.starts_with("\"Code\",\"Nom\","));
        assert_eq!(csv.lines().count(), 1);
    }
}
