use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::doctor::DoctorId;
use crate::user::UserId;

pub type AppointmentId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: UserId,
    pub doctor_id: DoctorId,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Appointment fields as submitted before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: UserId,
    pub doctor_id: DoctorId,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl NewAppointment {
    pub fn with_id(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_date: self.appointment_date,
            status: self.status,
            notes: self.notes,
            cost: self.cost,
            created_at: self.created_at,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Rejected,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "PENDING"),
            AppointmentStatus::Confirmed => write!(f, "CONFIRMED"),
            AppointmentStatus::Rejected => write!(f, "REJECTED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_wire_format_is_upper_case() {
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");

        let parsed: AppointmentStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Completed);
        assert_eq!(AppointmentStatus::Pending.to_string(), "PENDING");
    }

    #[test]
    fn test_new_appointment_with_id_leaves_updated_at_unset() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let appointment = NewAppointment {
            patient_id: 1,
            doctor_id: 2,
            appointment_date: created,
            status: AppointmentStatus::Pending,
            notes: None,
            cost: Some(120.0),
            created_at: created,
        }
        .with_id(42);

        assert_eq!(appointment.id, 42);
        assert_eq!(appointment.updated_at, None);
        assert_eq!(appointment.cost, Some(120.0));
    }
}
