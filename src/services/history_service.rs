use chrono::{Local, NaiveDate, Utc};
use sea_orm::*;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::daily_history::{self, Column as HistoryColumn, Entity as DailyHistory, Snapshot};
use crate::models::patient::{self, Entity as Patients};
use crate::models::transfusion::Priority;

/// Journal dénormalisé par jour calendaire.
///
/// Les écritures sont additives : on ajoute des snapshots en fin de tableau,
/// jamais de réécriture des entrées passées. Chaque append relit puis réécrit
/// sa ligne dans une transaction, sous `SELECT ... FOR UPDATE` : deux
/// planifications simultanées du même jour ne perdent aucun snapshot. L'ajout
/// au journal et la mise à jour du patient restent en revanche des écritures
/// séparées : un crash entre les deux laisse une transfusion sans entrée de
/// journal (fenêtre d'incohérence acceptée, le journal n'est qu'une
/// projection de reporting).
pub struct HistoryService;

impl HistoryService {
    /// Copie les champs cliniques d'un patient dans un snapshot.
    pub fn snapshot_from_patient(
        patient: &patient::Model,
        priority: Option<Priority>,
        time: String,
    ) -> Snapshot {
        Snapshot {
            name: format!("{} {}", patient.first_name, patient.last_name),
            priority,
            blood_type: patient.blood_type.clone(),
            ph: patient.ph.clone(),
            hb: patient.hb,
            poches: patient.poches,
            has_f: patient.has_f,
            has_c: patient.has_c,
            has_l: patient.has_l,
            don: patient.don.clone(),
            hdist: patient.hdist.clone(),
            hrecu: patient.hrecu.clone(),
            time,
        }
    }

    /// Ajoute le snapshot en fin de tableau sans toucher aux entrées
    /// existantes (tableau neuf si la colonne ne contient pas un tableau).
    fn with_appended(
        entries: serde_json::Value,
        snapshot: &Snapshot,
    ) -> Result<serde_json::Value, ServiceError> {
        let snapshot_json = serde_json::to_value(snapshot)
            .map_err(|e| ServiceError::Database(DbErr::Custom(e.to_string())))?;

        let mut items = match entries {
            serde_json::Value::Array(items) => items,
            _ => Vec::new(),
        };
        items.push(snapshot_json);

        Ok(serde_json::Value::Array(items))
    }

    /// Ajoute un snapshot à l'entrée du jour donné (upsert par date,
    /// append en fin de tableau). La relecture se fait sous verrou de
    /// ligne dans une transaction ; deux premiers ajouts simultanés du
    /// même jour sont départagés par l'unicité de `day` (le second insert
    /// échoue).
    pub async fn append(
        db: &DatabaseConnection,
        day: NaiveDate,
        snapshot: Snapshot,
    ) -> Result<daily_history::Model, ServiceError> {
        let txn = db.begin().await?;

        let existing = DailyHistory::find()
            .filter(HistoryColumn::Day.eq(day))
            .lock_exclusive()
            .one(&txn)
            .await?;

        let entry = match existing {
            Some(entry) => {
                let entries = Self::with_appended(entry.entries.clone(), &snapshot)?;

                let mut active: daily_history::ActiveModel = entry.into();
                active.entries = Set(entries);
                active.updated_at = Set(Utc::now());

                active.update(&txn).await?
            }
            None => {
                let now = Utc::now();
                let new_entry = daily_history::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    day: Set(day),
                    entries: Set(Self::with_appended(serde_json::json!([]), &snapshot)?),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                new_entry.insert(&txn).await?
            }
        };

        txn.commit().await?;

        Ok(entry)
    }

    /// Ajoute le même snapshot à l'historique embarqué du patient
    /// (`schedules`). Le patient est relu sous verrou de ligne dans une
    /// transaction, comme pour le journal.
    pub async fn push_to_patient_schedules(
        db: &DatabaseConnection,
        patient_id: Uuid,
        snapshot: &Snapshot,
    ) -> Result<patient::Model, ServiceError> {
        let txn = db.begin().await?;

        let patient = Patients::find_by_id(patient_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound("Patient"))?;

        let schedules = Self::with_appended(patient.schedules.clone(), snapshot)?;

        let mut active: patient::ActiveModel = patient.into();
        active.schedules = Set(schedules);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Heure locale courante au format "HH:MM" (heure de l'événement
    /// portée par les snapshots).
    pub fn current_time_of_day() -> String {
        Local::now().format("%H:%M").to_string()
    }

    pub async fn list(
        db: &DatabaseConnection,
        day: Option<NaiveDate>,
    ) -> Result<Vec<daily_history::Model>, ServiceError> {
        let mut query = DailyHistory::find().order_by_desc(HistoryColumn::Day);
        if let Some(day) = day {
            query = query.filter(HistoryColumn::Day.eq(day));
        }

        Ok(query.all(db).await?)
    }

    pub async fn get(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<daily_history::Model, ServiceError> {
        DailyHistory::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Historique"))
    }

    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
        let result = DailyHistory::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Historique"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::{Gender, PatientStatus};

    fn sample_patient() -> patient::Model {
        patient::Model {
            id: Uuid::new_v4(),
            code: "PAT-9F3A27C1".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Diallo".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1994, 3, 15).unwrap(),
            gender: Gender::Female,
            phone: "0601020304".to_string(),
            email: None,
            address: None,
            emergency_contact: None,
            blood_type: "O+".to_string(),
            ph: Some("cceek+".to_string()),
            weight: Some(58.0),
            height: Some(165.0),
            hb: Some(8.2),
            has_f: true,
            has_c: false,
            has_l: false,
            poches: 2,
            hdist: Some("08:30".to_string()),
            hrecu: Some("09:10".to_string()),
            don: None,
            medical_history: None,
            patient_category: None,
            admission_date: None,
            last_donation_date: None,
            status: PatientStatus::Active,
            schedules: serde_json::json!([]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_snapshot_copies_clinical_fields() {
        let patient = sample_patient();
        let snapshot =
            HistoryService::snapshot_from_patient(&patient, Some(Priority::Regular), "09:00".into());

        assert_eq!(snapshot.name, "Amina Diallo");
        assert_eq!(snapshot.blood_type, "O+");
        assert_eq!(snapshot.ph.as_deref(), Some("cceek+"));
        assert_eq!(snapshot.poches, 2);
        assert!(snapshot.has_f);
        assert_eq!(snapshot.time, "09:00");
        assert_eq!(snapshot.priority, Some(Priority::Regular));
    }

    #[test]
    fn test_snapshot_without_transfusion_has_no_priority() {
        let patient = sample_patient();
        let snapshot = HistoryService::snapshot_from_patient(&patient, None, "14:30".into());
        assert_eq!(snapshot.priority, None);
    }

    #[test]
    fn test_with_appended_preserves_existing_entries() {
        let patient = sample_patient();
        let first = HistoryService::snapshot_from_patient(&patient, None, "08:00".into());
        let second =
            HistoryService::snapshot_from_patient(&patient, Some(Priority::Urgent), "10:30".into());

        let entries = HistoryService::with_appended(serde_json::json!([]), &first).unwrap();
        let entries = HistoryService::with_appended(entries, &second).unwrap();

        let items = entries.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["time"], "08:00");
        assert_eq!(items[1]["time"], "10:30");
    }

    #[test]
    fn test_with_appended_recovers_from_non_array_column() {
        let patient = sample_patient();
        let snapshot = HistoryService::snapshot_from_patient(&patient, None, "11:00".into());

        let entries = HistoryService::with_appended(serde_json::json!(null), &snapshot).unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_creates_the_day_entry() {
        let patient = sample_patient();
        let snapshot =
            HistoryService::snapshot_from_patient(&patient, Some(Priority::Regular), "09:00".into());
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let created = daily_history::Model {
            id: Uuid::new_v4(),
            day,
            entries: serde_json::json!([serde_json::to_value(&snapshot).unwrap()]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        // Aucune ligne pour ce jour, puis l'INSERT ... RETURNING
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<daily_history::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();

        let entry = HistoryService::append(&db, day, snapshot).await.unwrap();
        assert_eq!(entry.day, day);
        assert_eq!(entry.entries.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_pushes_onto_existing_day() {
        let patient = sample_patient();
        let morning = HistoryService::snapshot_from_patient(&patient, None, "08:00".into());
        let afternoon =
            HistoryService::snapshot_from_patient(&patient, Some(Priority::Urgent), "15:00".into());
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let existing = daily_history::Model {
            id: Uuid::new_v4(),
            day,
            entries: serde_json::json!([serde_json::to_value(&morning).unwrap()]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut updated = existing.clone();
        updated.entries = serde_json::json!([
            serde_json::to_value(&morning).unwrap(),
            serde_json::to_value(&afternoon).unwrap(),
        ]);

        // La ligne du jour (relue FOR UPDATE), puis l'UPDATE ... RETURNING
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![updated]])
            .into_connection();

        let entry = HistoryService::append(&db, day, afternoon).await.unwrap();
        let items = entry.entries.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["time"], "08:00");
        assert_eq!(items[1]["time"], "15:00");
    }

    #[tokio::test]
    async fn test_push_to_schedules_appends_for_the_patient() {
        let patient = sample_patient();
        let snapshot =
            HistoryService::snapshot_from_patient(&patient, Some(Priority::Regular), "09:00".into());

        let mut updated = patient.clone();
        updated.schedules = serde_json::json!([serde_json::to_value(&snapshot).unwrap()]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![patient.clone()]])
            .append_query_results([vec![updated]])
            .into_connection();

        let result = HistoryService::push_to_patient_schedules(&db, patient.id, &snapshot)
            .await
            .unwrap();
        assert_eq!(result.schedules.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_to_schedules_unknown_patient() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<patient::Model>::new()])
            .into_connection();

        let patient = sample_patient();
        let snapshot = HistoryService::snapshot_from_patient(&patient, None, "09:00".into());

        let result = HistoryService::push_to_patient_schedules(&db, Uuid::new_v4(), &snapshot).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
