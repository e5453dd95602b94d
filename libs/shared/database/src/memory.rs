use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use shared_models::{
    Appointment, AppointmentId, Doctor, DoctorId, MedicalReport, MedicalReportId,
    NewAppointment, NewDoctor, NewMedicalReport, Specialty, SpecialtyId, User, UserId,
};

use crate::store::ClinicStore;

#[derive(Default)]
struct Tables {
    appointments: BTreeMap<AppointmentId, Appointment>,
    doctors: BTreeMap<DoctorId, Doctor>,
    users: BTreeMap<UserId, User>,
    specialties: BTreeMap<SpecialtyId, Specialty>,
    medical_reports: BTreeMap<MedicalReportId, MedicalReport>,
    next_appointment_id: AppointmentId,
    next_doctor_id: DoctorId,
    next_medical_report_id: MedicalReportId,
}

/// Process-local store. Each call holds the lock for its own duration only.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        debug!("Seeding user {}", user.id);
        self.tables.write().await.users.insert(user.id, user);
    }

    pub async fn insert_specialty(&self, specialty: Specialty) {
        debug!("Seeding specialty {} ({})", specialty.id, specialty.name);
        self.tables.write().await.specialties.insert(specialty.id, specialty);
    }

    /// Stores a doctor under its own id, bumping the id sequence past it.
    pub async fn put_doctor(&self, doctor: Doctor) {
        let mut tables = self.tables.write().await;
        tables.next_doctor_id = tables.next_doctor_id.max(doctor.id);
        tables.doctors.insert(doctor.id, doctor);
    }

    /// Stores an appointment under its own id, bumping the id sequence past it.
    pub async fn put_appointment(&self, appointment: Appointment) {
        let mut tables = self.tables.write().await;
        tables.next_appointment_id = tables.next_appointment_id.max(appointment.id);
        tables.appointments.insert(appointment.id, appointment);
    }
}

#[async_trait]
impl ClinicStore for InMemoryStore {
    async fn find_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        Ok(self.tables.read().await.appointments.values().cloned().collect())
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        let mut tables = self.tables.write().await;
        tables.next_appointment_id += 1;
        let saved = appointment.with_id(tables.next_appointment_id);
        tables.appointments.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn save_appointment(&self, appointment: &Appointment) -> Result<Appointment> {
        self.tables
            .write()
            .await
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        self.tables.write().await.appointments.remove(&id);
        Ok(())
    }

    async fn count_appointments_by_doctor(&self, doctor_id: DoctorId) -> Result<u64> {
        let count = self
            .tables
            .read()
            .await
            .appointments
            .values()
            .filter(|appointment| appointment.doctor_id == doctor_id)
            .count();
        Ok(count as u64)
    }

    async fn find_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        Ok(self.tables.read().await.doctors.get(&id).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        Ok(self.tables.read().await.doctors.values().cloned().collect())
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let mut tables = self.tables.write().await;
        tables.next_doctor_id += 1;
        let saved = doctor.with_id(tables.next_doctor_id);
        tables.doctors.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn save_doctor(&self, doctor: &Doctor) -> Result<Doctor> {
        self.tables.write().await.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor.clone())
    }

    async fn save_doctors(&self, doctors: &[Doctor]) -> Result<Vec<Doctor>> {
        let mut tables = self.tables.write().await;
        for doctor in doctors {
            tables.doctors.insert(doctor.id, doctor.clone());
        }
        Ok(doctors.to_vec())
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        self.tables.write().await.doctors.remove(&id);
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_specialty(&self, id: SpecialtyId) -> Result<Option<Specialty>> {
        Ok(self.tables.read().await.specialties.get(&id).cloned())
    }

    async fn find_medical_report(&self, id: MedicalReportId) -> Result<Option<MedicalReport>> {
        Ok(self.tables.read().await.medical_reports.get(&id).cloned())
    }

    async fn list_medical_reports(&self) -> Result<Vec<MedicalReport>> {
        Ok(self.tables.read().await.medical_reports.values().cloned().collect())
    }

    async fn insert_medical_report(&self, report: NewMedicalReport) -> Result<MedicalReport> {
        let mut tables = self.tables.write().await;
        tables.next_medical_report_id += 1;
        let saved = report.with_id(tables.next_medical_report_id);
        tables.medical_reports.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn save_medical_report(&self, report: &MedicalReport) -> Result<MedicalReport> {
        self.tables
            .write()
            .await
            .medical_reports
            .insert(report.id, report.clone());
        Ok(report.clone())
    }

    async fn delete_medical_report(&self, id: MedicalReportId) -> Result<()> {
        self.tables.write().await.medical_reports.remove(&id);
        Ok(())
    }
}
