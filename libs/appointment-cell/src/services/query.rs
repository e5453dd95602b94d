// libs/appointment-cell/src/services/query.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use shared_database::ClinicStore;
use shared_models::{Appointment, AppointmentId, AppointmentStatus, DoctorId, UserId};

use crate::models::AppointmentError;

/// Read-only appointment listings. An empty list is a success.
pub struct AppointmentQueryService {
    store: Arc<dyn ClinicStore>,
}

impl AppointmentQueryService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.store
            .find_appointment(appointment_id)
            .await
            .map_err(AppointmentError::from_store)?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.load_where(|_| true).await
    }

    /// Most recent first.
    pub async fn list_by_patient(&self, patient_id: UserId) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.load_where(|a| a.patient_id == patient_id).await?;
        appointments.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
        Ok(appointments)
    }

    /// Earliest first.
    pub async fn list_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.load_where(|a| a.doctor_id == doctor_id).await?;
        appointments.sort_by_key(|a| a.appointment_date);
        Ok(appointments)
    }

    pub async fn list_by_status(&self, status: AppointmentStatus) -> Result<Vec<Appointment>, AppointmentError> {
        self.load_where(|a| a.status == status).await
    }

    pub async fn list_by_patient_and_status(
        &self,
        patient_id: UserId,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.load_where(|a| a.patient_id == patient_id && a.status == status)
            .await
    }

    pub async fn list_by_doctor_and_status(
        &self,
        doctor_id: DoctorId,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.load_where(|a| a.doctor_id == doctor_id && a.status == status)
            .await
    }

    /// Both bounds inclusive, earliest first.
    pub async fn list_for_doctor_between(
        &self,
        doctor_id: DoctorId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for doctor {} between {} and {}", doctor_id, start, end);

        let mut appointments = self
            .load_where(|a| {
                a.doctor_id == doctor_id && a.appointment_date >= start && a.appointment_date <= end
            })
            .await?;
        appointments.sort_by_key(|a| a.appointment_date);
        Ok(appointments)
    }

    async fn load_where<F>(&self, keep: F) -> Result<Vec<Appointment>, AppointmentError>
    where
        F: Fn(&Appointment) -> bool,
    {
        Ok(self
            .store
            .list_appointments()
            .await
            .map_err(AppointmentError::from_store)?
            .into_iter()
            .filter(|appointment| keep(appointment))
            .collect())
    }
}
