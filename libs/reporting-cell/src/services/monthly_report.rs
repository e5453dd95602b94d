// libs/reporting-cell/src/services/monthly_report.rs
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use shared_database::ClinicStore;
use shared_models::{Doctor, DoctorId};

use crate::models::{MonthlyReport, ReportError, UNKNOWN_DOCTOR_NAME, UNKNOWN_SPECIALTY};
use crate::services::aggregator::{aggregate_month, DoctorProfile, MonthWindow};

/// Read-only monthly analytics. Never writes to the store.
pub struct MonthlyReportService {
    store: Arc<dyn ClinicStore>,
}

impl MonthlyReportService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn generate_monthly_report(&self, year: i32, month: u32) -> Result<MonthlyReport, ReportError> {
        let window = MonthWindow::for_month(year, month).ok_or_else(|| {
            ReportError::ValidationError(format!("Invalid report month: {}-{:02}", year, month))
        })?;

        let appointments = self
            .store
            .list_appointments()
            .await
            .map_err(ReportError::from_store)?;

        let doctor_ids: BTreeSet<DoctorId> = appointments
            .iter()
            .filter(|appointment| window.contains(appointment.appointment_date))
            .map(|appointment| appointment.doctor_id)
            .collect();

        let mut profiles = HashMap::with_capacity(doctor_ids.len());
        for doctor_id in doctor_ids {
            profiles.insert(doctor_id, self.resolve_profile(doctor_id).await?);
        }

        let report = aggregate_month(&window, &appointments, &profiles);
        info!(
            "Monthly report {}-{:02}: {} appointments across {} doctors",
            year,
            month,
            report.total_appointments,
            report.doctor_statistics.len()
        );
        Ok(report)
    }

    async fn resolve_profile(&self, doctor_id: DoctorId) -> Result<DoctorProfile, ReportError> {
        let Some(doctor) = self
            .store
            .find_doctor(doctor_id)
            .await
            .map_err(ReportError::from_store)?
        else {
            debug!("Doctor {} no longer exists, using placeholder profile", doctor_id);
            return Ok(DoctorProfile::default());
        };

        Ok(DoctorProfile {
            name: self.resolve_name(&doctor).await?,
            specialty: self.resolve_specialty(&doctor).await?,
        })
    }

    async fn resolve_name(&self, doctor: &Doctor) -> Result<String, ReportError> {
        Ok(self
            .store
            .find_user(doctor.user_id)
            .await
            .map_err(ReportError::from_store)?
            .map(|user| user.full_name())
            .unwrap_or_else(|| UNKNOWN_DOCTOR_NAME.to_string()))
    }

    async fn resolve_specialty(&self, doctor: &Doctor) -> Result<String, ReportError> {
        let Some(specialty_id) = doctor.specialty_id else {
            return Ok(UNKNOWN_SPECIALTY.to_string());
        };

        Ok(self
            .store
            .find_specialty(specialty_id)
            .await
            .map_err(ReportError::from_store)?
            .map(|specialty| specialty.name)
            .unwrap_or_else(|| UNKNOWN_SPECIALTY.to_string()))
    }
}
