// libs/reporting-cell/src/services/aggregator.rs
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use shared_models::{Appointment, AppointmentStatus, DoctorId, UserId};

use crate::models::{DoctorStatistics, MonthlyReport, UNKNOWN_DOCTOR_NAME, UNKNOWN_SPECIALTY};

/// First second of day 1 through 23:59:59 of the last day, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// `None` for a month outside 1..=12 or a year chrono cannot represent.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        let start = first_day.and_hms_opt(0, 0, 0)?.and_utc();
        let end = next_month.and_hms_opt(0, 0, 0)?.and_utc() - Duration::seconds(1);

        Some(Self {
            year,
            month,
            start,
            end,
        })
    }

    /// `start <= t < end + 1s`, so sub-second times in the last second count.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end + Duration::seconds(1)
    }
}

/// Display fields for one doctor as resolved from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorProfile {
    pub name: String,
    pub specialty: String,
}

impl Default for DoctorProfile {
    fn default() -> Self {
        Self {
            name: UNKNOWN_DOCTOR_NAME.to_string(),
            specialty: UNKNOWN_SPECIALTY.to_string(),
        }
    }
}

#[derive(Default)]
struct DoctorTally {
    total: u64,
    patients: HashSet<UserId>,
    confirmed: u64,
    cancelled: u64,
    completed: u64,
}

/// Counts the appointments scheduled inside `window`. Doctors missing from
/// `profiles` get the default display fields.
pub fn aggregate_month(
    window: &MonthWindow,
    appointments: &[Appointment],
    profiles: &HashMap<DoctorId, DoctorProfile>,
) -> MonthlyReport {
    let mut report = MonthlyReport::empty(window.year, window.month);
    let mut tallies: BTreeMap<DoctorId, DoctorTally> = BTreeMap::new();

    for appointment in appointments
        .iter()
        .filter(|appointment| window.contains(appointment.appointment_date))
    {
        report.total_appointments += 1;
        match appointment.status {
            AppointmentStatus::Pending => report.pending_appointments += 1,
            AppointmentStatus::Confirmed => report.confirmed_appointments += 1,
            AppointmentStatus::Rejected => report.rejected_appointments += 1,
            AppointmentStatus::Cancelled => report.cancelled_appointments += 1,
            AppointmentStatus::Completed => report.completed_appointments += 1,
        }

        let tally = tallies.entry(appointment.doctor_id).or_default();
        tally.total += 1;
        tally.patients.insert(appointment.patient_id);
        match appointment.status {
            AppointmentStatus::Confirmed => tally.confirmed += 1,
            AppointmentStatus::Cancelled => tally.cancelled += 1,
            AppointmentStatus::Completed => tally.completed += 1,
            AppointmentStatus::Pending | AppointmentStatus::Rejected => {}
        }
    }

    // BTreeMap order is ascending id; the stable sort keeps it for ties.
    let mut statistics: Vec<DoctorStatistics> = tallies
        .into_iter()
        .map(|(doctor_id, tally)| {
            let profile = profiles.get(&doctor_id).cloned().unwrap_or_default();
            DoctorStatistics {
                doctor_id,
                doctor_name: profile.name,
                specialty: profile.specialty,
                total_appointments: tally.total,
                unique_patients: tally.patients.len() as u64,
                confirmed_appointments: tally.confirmed,
                cancelled_appointments: tally.cancelled,
                completed_appointments: tally.completed,
            }
        })
        .collect();
    statistics.sort_by(|a, b| b.total_appointments.cmp(&a.total_appointments));

    report.doctor_statistics = statistics;
    report
}
