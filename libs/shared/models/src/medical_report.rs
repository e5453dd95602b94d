use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::appointment::AppointmentId;

pub type MedicalReportId = i64;

/// Post-visit report. At most one exists per appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalReport {
    pub id: MedicalReportId,
    pub appointment_id: AppointmentId,
    pub diagnosis: String,
    pub symptoms: Option<String>,
    pub physical_examination: Option<String>,
    pub investigations: Option<String>,
    pub prescriptions: Vec<Prescription>,
    pub recommendations: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub additional_notes: Option<String>,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMedicalReport {
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
    pub created_date: DateTime<Utc>,
}

impl NewMedicalReport {
    pub fn with_id(self, id: MedicalReportId) -> MedicalReport {
        MedicalReport {
            id,
            appointment_id: self.appointment_id,
            diagnosis: self.diagnosis,
            symptoms: self.symptoms,
            physical_examination: self.physical_examination,
            investigations: self.investigations,
            prescriptions: self.prescriptions,
            recommendations: self.recommendations,
            follow_up_date: self.follow_up_date,
            additional_notes: self.additional_notes,
            created_date: self.created_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub medication: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
}
