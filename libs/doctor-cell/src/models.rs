use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use shared_models::error::AppError;
use shared_models::{DoctorId, SpecialtyId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub user_id: UserId,
    pub specialty_id: Option<SpecialtyId>,
    pub description: Option<String>,
    pub experience_years: Option<u32>,
    pub is_active: Option<bool>,
}

/// Full replacement of the editable doctor fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub specialty_id: Option<SpecialtyId>,
    pub description: Option<String>,
    pub experience_years: Option<u32>,
    pub is_active: bool,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found with id: {0}")]
    NotFound(DoctorId),

    #[error("Specialty not found with id: {0}")]
    SpecialtyNotFound(SpecialtyId),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DoctorError {
    pub fn from_store(err: anyhow::Error) -> Self {
        error!("Doctor store operation failed: {:#}", err);
        DoctorError::DatabaseError(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) | DoctorError::SpecialtyNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
