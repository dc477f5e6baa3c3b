use chrono::Local;
use futures::try_join;
use sea_orm::*;

use crate::errors::ServiceError;
use crate::models::dto::{AnalyticsSummary, CategoryCount, StatusCount};
use crate::models::patient::{
    Column as PatientColumn, Entity as Patients, PatientCategory, PatientStatus,
};
use crate::models::transfusion::{
    Column as TransfusionColumn, Entity as Transfusions, TransfusionStatus,
};

pub struct AnalyticsService;

impl AnalyticsService {
    /// Compteurs du tableau de bord. Les deux totaux partent en parallèle,
    /// les ventilations par catégorie/statut suivent séquentiellement.
    pub async fn summary(db: &DatabaseConnection) -> Result<AnalyticsSummary, ServiceError> {
        let today = Local::now().date_naive();

        let active_patients = Patients::find()
            .filter(PatientColumn::Status.ne(PatientStatus::Deleted))
            .count(db);
        let transfusions_today = Transfusions::find()
            .filter(TransfusionColumn::ScheduledDate.eq(today))
            .count(db);

        let (active_patients, transfusions_today) =
            try_join!(active_patients, transfusions_today)?;

        let mut patients_by_category = Vec::new();
        for category in PatientCategory::iter() {
            let count = Patients::find()
                .filter(PatientColumn::Status.ne(PatientStatus::Deleted))
                .filter(PatientColumn::PatientCategory.eq(category))
                .count(db)
                .await?;
            patients_by_category.push(CategoryCount { category, count });
        }

        let mut today_by_status = Vec::new();
        for status in TransfusionStatus::iter() {
            let count = Transfusions::find()
                .filter(TransfusionColumn::ScheduledDate.eq(today))
                .filter(TransfusionColumn::Status.eq(status))
                .count(db)
                .await?;
            today_by_status.push(StatusCount { status, count });
        }

        Ok(AnalyticsSummary {
            active_patients,
            transfusions_today,
            patients_by_category,
            today_by_status,
        })
    }
}
