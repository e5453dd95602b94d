// libs/reporting-cell/src/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use shared_models::error::AppError;
use shared_models::DoctorId;

pub const UNKNOWN_DOCTOR_NAME: &str = "Unknown";
pub const UNKNOWN_SPECIALTY: &str = "N/A";

/// Appointment volume for one calendar month (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub total_appointments: u64,
    pub confirmed_appointments: u64,
    pub cancelled_appointments: u64,
    pub completed_appointments: u64,
    pub pending_appointments: u64,
    pub rejected_appointments: u64,
    /// Busiest doctor first; equal totals by ascending doctor id.
    pub doctor_statistics: Vec<DoctorStatistics>,
}

impl MonthlyReport {
    pub fn empty(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            total_appointments: 0,
            confirmed_appointments: 0,
            cancelled_appointments: 0,
            completed_appointments: 0,
            pending_appointments: 0,
            rejected_appointments: 0,
            doctor_statistics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorStatistics {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub specialty: String,
    pub total_appointments: u64,
    pub unique_patients: u64,
    pub confirmed_appointments: u64,
    pub cancelled_appointments: u64,
    pub completed_appointments: u64,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ReportError {
    pub fn from_store(err: anyhow::Error) -> Self {
        error!("Report store operation failed: {:#}", err);
        ReportError::DatabaseError(err.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::ValidationError(msg) => AppError::ValidationError(msg),
            ReportError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
