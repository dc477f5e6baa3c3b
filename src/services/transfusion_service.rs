use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::dto::{
    PaginatedTransfusions, ScheduleTransfusionRequest, TransfusionListQuery,
    TransfusionWithPatient,
};
use crate::models::patient::{Entity as Patients, PatientStatus};
use crate::models::transfusion::{
    self, Column as TransfusionColumn, Entity as Transfusions, TransfusionStatus,
};
use crate::services::history_service::HistoryService;
use crate::services::patient_service::PatientService;
use crate::utils::ids;

const DEFAULT_PER_PAGE: u64 = 50;
const MAX_PER_PAGE: u64 = 200;

pub struct TransfusionService;

impl TransfusionService {
    /// Combine une date et une heure "HH:MM" en un seul instant planifié.
    pub fn combine_schedule(
        date: NaiveDate,
        time_of_day: &str,
    ) -> Result<NaiveDateTime, ServiceError> {
        let time = NaiveTime::parse_from_str(time_of_day, "%H:%M")
            .map_err(|_| ServiceError::Validation("Heure invalide (format HH:MM)".to_string()))?;

        Ok(date.and_time(time))
    }

    /// Planifie une transfusion : crée l'enregistrement puis dénormalise un
    /// snapshot du patient vers le journal du jour et vers `schedules`.
    ///
    /// Les trois écritures sont séparées (pas de transaction multi-table) :
    /// la fenêtre d'incohérence est acceptée, le journal n'étant qu'une
    /// projection.
    pub async fn schedule(
        db: &DatabaseConnection,
        request: ScheduleTransfusionRequest,
    ) -> Result<transfusion::Model, ServiceError> {
        let patient = PatientService::get_patient(db, request.patient_id).await?;
        if patient.status == PatientStatus::Deleted {
            // Un dossier supprimé est introuvable pour la planification
            return Err(ServiceError::NotFound("Patient"));
        }
        let scheduled_time = Self::combine_schedule(request.scheduled_date, &request.scheduled_time)?;

        let now = Utc::now();
        let new_transfusion = transfusion::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(ids::transfusion_code()),
            patient_id: Set(patient.id),
            scheduled_date: Set(request.scheduled_date),
            scheduled_time: Set(scheduled_time),
            priority: Set(request.priority),
            blood_units: Set(request.blood_units),
            status: Set(TransfusionStatus::Scheduled),
            notes: Set(request.notes),
            cancellation_reason: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = new_transfusion.insert(db).await?;

        let snapshot = HistoryService::snapshot_from_patient(
            &patient,
            Some(request.priority),
            request.scheduled_time.clone(),
        );
        HistoryService::append(db, request.scheduled_date, snapshot.clone()).await?;
        HistoryService::push_to_patient_schedules(db, patient.id, &snapshot).await?;

        Ok(created)
    }

    /// Listing filtré et paginé, patient peuplé sur chaque ligne.
    /// Une référence patient cassée donne `patient: null`, la ligne reste.
    pub async fn list(
        db: &DatabaseConnection,
        query: &TransfusionListQuery,
    ) -> Result<PaginatedTransfusions, ServiceError> {
        let mut select = Transfusions::find();

        if let Some(date) = query.date {
            select = select.filter(TransfusionColumn::ScheduledDate.eq(date));
        }
        if let Some(priority) = query.priority {
            select = select.filter(TransfusionColumn::Priority.eq(priority));
        }
        if let Some(status) = query.status {
            select = select.filter(TransfusionColumn::Status.eq(status));
        }
        if let Some(patient_id) = query.patient_id {
            select = select.filter(TransfusionColumn::PatientId.eq(patient_id));
        }

        // Les urgences d'abord ('urgent' > 'regular'), puis l'heure prévue
        let select = select
            .find_also_related(Patients)
            .order_by_desc(TransfusionColumn::Priority)
            .order_by_asc(TransfusionColumn::ScheduledTime);

        let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let page = query.page.unwrap_or(1).max(1);

        let paginator = select.paginate(db, per_page);
        let total_items = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let items = rows
            .into_iter()
            .map(|(transfusion, patient)| TransfusionWithPatient { transfusion, patient })
            .collect();

        Ok(PaginatedTransfusions {
            items,
            page,
            per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page),
        })
    }

    /// Liste opérationnelle du jour.
    pub async fn today(db: &DatabaseConnection) -> Result<PaginatedTransfusions, ServiceError> {
        let query = TransfusionListQuery {
            date: Some(Local::now().date_naive()),
            ..Default::default()
        };

        Self::list(db, &query).await
    }

    pub async fn get(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<transfusion::Model, ServiceError> {
        Transfusions::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Transfusion"))
    }

    /// Fait avancer le statut selon la table de transitions.
    ///
    /// `completed` pose completedAt, tout autre statut l'efface ;
    /// une annulation exige un motif.
    pub async fn set_status(
        db: &DatabaseConnection,
        id: Uuid,
        new_status: TransfusionStatus,
        reason: Option<String>,
    ) -> Result<transfusion::Model, ServiceError> {
        let existing = Self::get(db, id).await?;

        if !existing.status.can_transition(new_status) {
            return Err(ServiceError::Conflict(format!(
                "Transition de statut non autorisée : {:?} → {:?}",
                existing.status, new_status
            )));
        }

        if new_status == TransfusionStatus::Cancelled
            && reason.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            return Err(ServiceError::Validation(
                "Motif d'annulation requis".to_string(),
            ));
        }

        let mut active: transfusion::ActiveModel = existing.into();
        active.status = Set(new_status);
        active.completed_at = Set(if new_status == TransfusionStatus::Completed {
            Some(Utc::now())
        } else {
            None
        });
        if new_status == TransfusionStatus::Cancelled {
            active.cancellation_reason = Set(reason);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(db).await?)
    }

    /// Suppression physique, indépendante du patient.
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let result = Transfusions::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Transfusion"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::{self, Gender};
    use crate::models::transfusion::Priority;

    fn deleted_patient() -> patient::Model {
        patient::Model {
            id: Uuid::new_v4(),
            code: "PAT-5D21E8B0".to_string(),
            first_name: "Karim".to_string(),
            last_name: "Haddad".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 11, 2).unwrap(),
            gender: Gender::Male,
            phone: "0605040302".to_string(),
            email: None,
            address: None,
            emergency_contact: None,
            blood_type: "A-".to_string(),
            ph: None,
            weight: None,
            height: None,
            hb: None,
            has_f: false,
            has_c: false,
            has_l: false,
            poches: 1,
            hdist: None,
            hrecu: None,
            don: None,
            medical_history: None,
            patient_category: None,
            admission_date: None,
            last_donation_date: None,
            status: PatientStatus::Deleted,
            schedules: serde_json::json!([]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_schedule_rejects_deleted_patient() {
        let patient = deleted_patient();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![patient.clone()]])
            .into_connection();

        let request = ScheduleTransfusionRequest {
            patient_id: patient.id,
            scheduled_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            scheduled_time: "09:00".to_string(),
            priority: Priority::Regular,
            blood_units: 2,
            notes: None,
        };

        // Refusé avant toute insertion
        let result = TransfusionService::schedule(&db, request).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Patient"))));
    }

    #[test]
    fn test_combine_schedule() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let instant = TransfusionService::combine_schedule(date, "09:00").unwrap();

        assert_eq!(
            instant,
            NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_combine_schedule_rejects_bad_time() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert!(matches!(
            TransfusionService::combine_schedule(date, "25:00"),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            TransfusionService::combine_schedule(date, "neuf heures"),
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_set_status_rejects_illegal_transition() {
        let existing = transfusion::Model {
            id: Uuid::new_v4(),
            code: "TRF-4B0C81D9".to_string(),
            patient_id: Uuid::new_v4(),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            scheduled_time: NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            priority: Priority::Regular,
            blood_units: 2,
            status: TransfusionStatus::Scheduled,
            notes: None,
            cancellation_reason: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .into_connection();

        // scheduled → completed n'est pas dans la table
        let result = TransfusionService::set_status(
            &db,
            existing.id,
            TransfusionStatus::Completed,
            None,
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() {
        let existing = transfusion::Model {
            id: Uuid::new_v4(),
            code: "TRF-11111111".to_string(),
            patient_id: Uuid::new_v4(),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            scheduled_time: NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            priority: Priority::Urgent,
            blood_units: 1,
            status: TransfusionStatus::Scheduled,
            notes: None,
            cancellation_reason: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .into_connection();

        let result = TransfusionService::set_status(
            &db,
            existing.id,
            TransfusionStatus::Cancelled,
            Some("   ".to_string()),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
