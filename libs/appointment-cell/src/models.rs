// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use doctor_cell::DoctorError;
use shared_models::error::AppError;
use shared_models::{
    AppointmentId, AppointmentStatus, DoctorId, MedicalReportId, Prescription, UserId,
};

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: UserId,
    pub doctor_id: DoctorId,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub cost: Option<f64>,
}

/// Replacement values for an existing appointment. Every field overwrites
/// the stored one, including `None`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub doctor_id: DoctorId,
    pub appointment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicalReportRequest {
    pub appointment_id: AppointmentId,
    pub diagnosis: String,
    pub symptoms: Option<String>,
    pub physical_examination: Option<String>,
    pub investigations: Option<String>,
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    pub recommendations: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub additional_notes: Option<String>,
}

/// `prescriptions: None` keeps the stored list; `Some` replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMedicalReportRequest {
    pub diagnosis: String,
    pub symptoms: Option<String>,
    pub physical_examination: Option<String>,
    pub investigations: Option<String>,
    pub prescriptions: Option<Vec<Prescription>>,
    pub recommendations: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub additional_notes: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found with id: {0}")]
    NotFound(AppointmentId),

    #[error("Doctor not found with id: {0}")]
    DoctorNotFound(DoctorId),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    pub fn from_store(err: anyhow::Error) -> Self {
        error!("Appointment store operation failed: {:#}", err);
        AppointmentError::DatabaseError(err.to_string())
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(doctor_id) => AppointmentError::DoctorNotFound(doctor_id),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_) | AppointmentError::DoctorNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum MedicalReportError {
    #[error("Medical report not found with id: {0}")]
    NotFound(MedicalReportId),

    #[error("Appointment not found with id: {0}")]
    AppointmentNotFound(AppointmentId),

    #[error("Medical report already exists for appointment {0}")]
    AlreadyExists(AppointmentId),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl MedicalReportError {
    pub fn from_store(err: anyhow::Error) -> Self {
        error!("Medical report store operation failed: {:#}", err);
        MedicalReportError::DatabaseError(err.to_string())
    }
}

impl From<MedicalReportError> for AppError {
    fn from(err: MedicalReportError) -> Self {
        match err {
            MedicalReportError::NotFound(_) | MedicalReportError::AppointmentNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            MedicalReportError::AlreadyExists(_) => AppError::Conflict(err.to_string()),
            MedicalReportError::ValidationError(msg) => AppError::ValidationError(msg),
            MedicalReportError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
