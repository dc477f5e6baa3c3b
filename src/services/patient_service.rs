use chrono::{Local, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::*;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::dto::{CreatePatientRequest, PatientListQuery, UpdatePatientRequest};
use crate::models::patient::{self, Column as PatientColumn, Entity as Patients, PatientStatus};
use crate::services::history_service::HistoryService;
use crate::utils::ids;

pub struct PatientService;

impl PatientService {
    pub async fn create_patient(
        db: &DatabaseConnection,
        request: CreatePatientRequest,
    ) -> Result<patient::Model, ServiceError> {
        let now = Utc::now();

        let new_patient = patient::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(ids::patient_code()),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            date_of_birth: Set(request.date_of_birth),
            gender: Set(request.gender),
            phone: Set(request.phone),
            email: Set(request.email),
            address: Set(request.address),
            emergency_contact: Set(request.emergency_contact),
            blood_type: Set(request.blood_type),
            ph: Set(request.ph),
            weight: Set(request.weight),
            height: Set(request.height),
            hb: Set(request.hb),
            has_f: Set(request.has_f),
            has_c: Set(request.has_c),
            has_l: Set(request.has_l),
            poches: Set(request.poches),
            hdist: Set(request.hdist),
            hrecu: Set(request.hrecu),
            don: Set(request.don),
            medical_history: Set(request.medical_history),
            patient_category: Set(request.patient_category),
            admission_date: Set(request.admission_date),
            last_donation_date: Set(request.last_donation_date),
            status: Set(PatientStatus::Active),
            schedules: Set(serde_json::json!([])),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        Ok(new_patient.insert(db).await?)
    }

    /// Construit la requête de listing : filtres combinés en AND, patients
    /// supprimés toujours exclus, tri par date de création décroissante.
    pub fn build_listing(filters: &PatientListQuery) -> Select<Patients> {
        let mut query = Patients::find()
            .filter(PatientColumn::Status.ne(PatientStatus::Deleted))
            .order_by_desc(PatientColumn::CreatedAt);

        if let Some(search) = &filters.search {
            // Sous-chaîne insensible à la casse sur nom / téléphone /
            // email / code patient
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(Self::ilike(PatientColumn::FirstName, &pattern))
                    .add(Self::ilike(PatientColumn::LastName, &pattern))
                    .add(Self::ilike(PatientColumn::Phone, &pattern))
                    .add(Self::ilike(PatientColumn::Email, &pattern))
                    .add(Self::ilike(PatientColumn::Code, &pattern)),
            );
        }
        if let Some(blood_type) = &filters.blood_type {
            query = query.filter(PatientColumn::BloodType.eq(blood_type));
        }
        if let Some(ph) = &filters.ph {
            query = query.filter(PatientColumn::Ph.eq(ph));
        }
        if let Some(gender) = filters.gender {
            query = query.filter(PatientColumn::Gender.eq(gender));
        }
        if let Some(category) = filters.category {
            query = query.filter(PatientColumn::PatientCategory.eq(category));
        }

        query
    }

    fn ilike(column: PatientColumn, pattern: &str) -> sea_query::SimpleExpr {
        Expr::expr(Func::lower(Expr::col((patient::Entity, column)))).like(pattern)
    }

    pub async fn list_patients(
        db: &DatabaseConnection,
        filters: &PatientListQuery,
    ) -> Result<Vec<patient::Model>, ServiceError> {
        Ok(Self::build_listing(filters).all(db).await?)
    }

    /// Recherche directe par id : renvoie aussi les dossiers supprimés
    /// (piste d'audit), contrairement au listing.
    pub async fn get_patient(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<patient::Model, ServiceError> {
        Patients::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Patient"))
    }

    /// Fusionne les champs fournis dans le dossier existant. Une édition
    /// clinique ajoute un snapshot au journal du jour.
    pub async fn update_patient(
        db: &DatabaseConnection,
        id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<patient::Model, ServiceError> {
        let existing = Self::get_patient(db, id).await?;
        let touches_clinical = request.touches_clinical();

        let mut active: patient::ActiveModel = existing.into();
        if let Some(v) = request.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = request.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = request.date_of_birth {
            active.date_of_birth = Set(v);
        }
        if let Some(v) = request.gender {
            active.gender = Set(v);
        }
        if let Some(v) = request.phone {
            active.phone = Set(v);
        }
        if let Some(v) = request.email {
            active.email = Set(Some(v));
        }
        if let Some(v) = request.address {
            active.address = Set(Some(v));
        }
        if let Some(v) = request.emergency_contact {
            active.emergency_contact = Set(Some(v));
        }
        if let Some(v) = request.blood_type {
            active.blood_type = Set(v);
        }
        if let Some(v) = request.ph {
            active.ph = Set(Some(v));
        }
        if let Some(v) = request.weight {
            active.weight = Set(Some(v));
        }
        if let Some(v) = request.height {
            active.height = Set(Some(v));
        }
        if let Some(v) = request.hb {
            active.hb = Set(Some(v));
        }
        if let Some(v) = request.has_f {
            active.has_f = Set(v);
        }
        if let Some(v) = request.has_c {
            active.has_c = Set(v);
        }
        if let Some(v) = request.has_l {
            active.has_l = Set(v);
        }
        if let Some(v) = request.poches {
            active.poches = Set(v);
        }
        if let Some(v) = request.hdist {
            active.hdist = Set(Some(v));
        }
        if let Some(v) = request.hrecu {
            active.hrecu = Set(Some(v));
        }
        if let Some(v) = request.don {
            active.don = Set(Some(v));
        }
        if let Some(v) = request.medical_history {
            active.medical_history = Set(Some(v));
        }
        if let Some(v) = request.patient_category {
            active.patient_category = Set(Some(v));
        }
        if let Some(v) = request.admission_date {
            active.admission_date = Set(Some(v));
        }
        if let Some(v) = request.last_donation_date {
            active.last_donation_date = Set(Some(v));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;

        if touches_clinical {
            // Édition clinique du jour : même dénormalisation qu'une
            // planification, sans priorité associée
            let time = HistoryService::current_time_of_day();
            let snapshot = HistoryService::snapshot_from_patient(&updated, None, time);
            HistoryService::append(db, Local::now().date_naive(), snapshot.clone()).await?;
            return HistoryService::push_to_patient_schedules(db, updated.id, &snapshot).await;
        }

        Ok(updated)
    }

    /// Suppression logique : le dossier reste en base (status=deleted),
    /// exclu de tous les listings.
    pub async fn soft_delete_patient(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<patient::Model, ServiceError> {
        let existing = Self::get_patient(db, id).await?;

        let mut active: patient::ActiveModel = existing.into();
        active.status = Set(PatientStatus::Deleted);
        active.deleted_at = Set(Some(Utc::now()));
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::PatientCategory;

    fn listing_sql(filters: &PatientListQuery) -> String {
        PatientService::build_listing(filters)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_listing_always_excludes_deleted() {
        let sql = listing_sql(&PatientListQuery::default());
        assert!(sql.contains(r#""status" <> 'deleted'"#));
        assert!(sql.contains(r#"ORDER BY "patients"."created_at" DESC"#));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let filters = PatientListQuery {
            blood_type: Some("A+".to_string()),
            category: Some(PatientCategory::PolyTransfuses),
            ..Default::default()
        };
        let sql = listing_sql(&filters);

        assert!(sql.contains(r#""blood_type" = 'A+'"#));
        assert!(sql.contains("'PolyTransfuses'"));
        // AND entre les deux filtres, pas de OR
        let and_section = sql.split("WHERE").nth(1).unwrap();
        assert!(and_section.contains("AND"));
        assert!(!and_section.contains(" OR "));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let filters = PatientListQuery {
            search: Some("DiAllo".to_string()),
            ..Default::default()
        };
        let sql = listing_sql(&filters);

        assert!(sql.contains("LOWER"));
        assert!(sql.contains("%diallo%"));
        // La recherche libre couvre nom, téléphone, email et code
        let where_section = sql.split("WHERE").nth(1).unwrap();
        assert!(where_section.contains(" OR "));
    }
}
