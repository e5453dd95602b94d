// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use doctor_cell::PopularityService;
use shared_config::AppConfig;
use shared_database::ClinicStore;
use shared_models::{Appointment, AppointmentId, AppointmentStatus, NewAppointment, User};

use crate::models::{AppointmentDetails, AppointmentError, BookAppointmentRequest};
use crate::services::notification::{AppointmentNotice, Notifier};

const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
enum NoticeKind {
    Confirmation,
    Cancellation,
}

/// Sole writer of appointment status and `updated_at`.
///
/// Any status may move to any other status. Transitions and updates are
/// load-modify-save against the store with no version check, so two
/// concurrent writers to the same appointment resolve as last write wins.
pub struct AppointmentLifecycleService {
    store: Arc<dyn ClinicStore>,
    popularity: Arc<PopularityService>,
    notifier: Arc<dyn Notifier>,
    notification_timeout: Duration,
}

impl AppointmentLifecycleService {
    pub fn new(
        store: Arc<dyn ClinicStore>,
        popularity: Arc<PopularityService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            popularity,
            notifier,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }

    /// Same as `new`, with the notification timeout taken from
    /// `NOTIFICATION_TIMEOUT_SECONDS`.
    pub fn from_config(
        store: Arc<dyn ClinicStore>,
        popularity: Arc<PopularityService>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        Self::new(store, popularity, notifier)
            .with_notification_timeout(Duration::from_secs(config.notification_timeout_seconds))
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    pub fn notification_timeout(&self) -> Duration {
        self.notification_timeout
    }

    /// Books a pending appointment, bumps the doctor's popularity and sends
    /// a best-effort confirmation.
    ///
    /// The popularity bump is written before the appointment. If the insert
    /// then fails, the doctor keeps the +1 until the next recompute.
    #[instrument(skip(self, request), fields(doctor_id = request.doctor_id, patient_id = request.patient_id))]
    pub async fn create(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment at {}", request.appointment_date);

        self.store
            .find_doctor(request.doctor_id)
            .await
            .map_err(AppointmentError::from_store)?
            .ok_or(AppointmentError::DoctorNotFound(request.doctor_id))?;

        self.popularity.increment_popularity(request.doctor_id).await?;

        let appointment = self
            .store
            .insert_appointment(NewAppointment {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                appointment_date: request.appointment_date,
                status: AppointmentStatus::Pending,
                notes: request.notes,
                cost: request.cost,
                created_at: Utc::now(),
            })
            .await
            .map_err(AppointmentError::from_store)?;

        info!("Appointment {} booked", appointment.id);

        self.dispatch(NoticeKind::Confirmation, &appointment).await;
        Ok(appointment)
    }

    #[instrument(skip(self))]
    pub async fn transition_to(
        &self,
        appointment_id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;
        let previous = appointment.status;

        appointment.status = status;
        appointment.updated_at = Some(touched_at(appointment.created_at));

        let saved = self
            .store
            .save_appointment(&appointment)
            .await
            .map_err(AppointmentError::from_store)?;

        info!("Appointment {} moved {} -> {}", appointment_id, previous, status);
        Ok(saved)
    }

    pub async fn confirm(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.transition_to(appointment_id, AppointmentStatus::Confirmed).await
    }

    pub async fn reject(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.transition_to(appointment_id, AppointmentStatus::Rejected).await
    }

    pub async fn complete(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.transition_to(appointment_id, AppointmentStatus::Completed).await
    }

    pub async fn set_pending(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.transition_to(appointment_id, AppointmentStatus::Pending).await
    }

    /// Cancels and sends a best-effort cancellation notice.
    pub async fn cancel(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .transition_to(appointment_id, AppointmentStatus::Cancelled)
            .await?;

        self.dispatch(NoticeKind::Cancellation, &appointment).await;
        Ok(appointment)
    }

    /// Replaces doctor, date, notes, status and cost in one write.
    #[instrument(skip(self, details))]
    pub async fn update(
        &self,
        appointment_id: AppointmentId,
        details: AppointmentDetails,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.load(appointment_id).await?;

        if details.doctor_id != appointment.doctor_id {
            self.store
                .find_doctor(details.doctor_id)
                .await
                .map_err(AppointmentError::from_store)?
                .ok_or(AppointmentError::DoctorNotFound(details.doctor_id))?;
        }

        appointment.doctor_id = details.doctor_id;
        appointment.appointment_date = details.appointment_date;
        appointment.notes = details.notes;
        appointment.status = details.status;
        appointment.cost = details.cost;
        appointment.updated_at = Some(touched_at(appointment.created_at));

        let saved = self
            .store
            .save_appointment(&appointment)
            .await
            .map_err(AppointmentError::from_store)?;

        info!("Appointment {} updated", appointment_id);
        Ok(saved)
    }

    pub async fn delete(&self, appointment_id: AppointmentId) -> Result<(), AppointmentError> {
        info!("Deleting appointment {}", appointment_id);
        self.store
            .delete_appointment(appointment_id)
            .await
            .map_err(AppointmentError::from_store)
    }

    async fn load(&self, appointment_id: AppointmentId) -> Result<Appointment, AppointmentError> {
        self.store
            .find_appointment(appointment_id)
            .await
            .map_err(AppointmentError::from_store)?
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    async fn resolve_patient(&self, appointment: &Appointment) -> Option<User> {
        match self.store.find_user(appointment.patient_id).await {
            Ok(patient) => patient,
            Err(e) => {
                warn!(
                    "Could not load patient {} for appointment {}: {:#}",
                    appointment.patient_id, appointment.id, e
                );
                None
            }
        }
    }

    /// Never fails; delivery problems are logged and dropped.
    async fn dispatch(&self, kind: NoticeKind, appointment: &Appointment) {
        let notice = AppointmentNotice {
            appointment: appointment.clone(),
            patient: self.resolve_patient(appointment).await,
        };

        let send = async {
            match kind {
                NoticeKind::Confirmation => self.notifier.send_appointment_confirmation(&notice).await,
                NoticeKind::Cancellation => self.notifier.send_appointment_cancellation(&notice).await,
            }
        };

        match tokio::time::timeout(self.notification_timeout, send).await {
            Ok(Ok(())) => debug!("{:?} notice handled for appointment {}", kind, appointment.id),
            Ok(Err(e)) => warn!(
                "{:?} notice for appointment {} failed: {}",
                kind, appointment.id, e
            ),
            Err(_) => warn!(
                "{:?} notice for appointment {} timed out after {:?}",
                kind, appointment.id, self.notification_timeout
            ),
        }
    }
}

/// Wall-clock time, never earlier than `created_at`.
fn touched_at(created_at: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(created_at)
}
