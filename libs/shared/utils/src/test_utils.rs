use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use shared_config::AppConfig;
use shared_database::{ClinicStore, InMemoryStore};
use shared_models::{
    Appointment, AppointmentId, AppointmentStatus, Doctor, DoctorId, MedicalReport,
    MedicalReportId, NewAppointment, NewDoctor, NewMedicalReport, Specialty, SpecialtyId, User,
    UserId,
};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_name: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            clinic_name: "Test Clinic".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            clinic_name: self.clinic_name.clone(),
            mail_from: "noreply@test-clinic.example".to_string(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("valid test timestamp")
}

pub fn test_user(id: UserId, first_name: &str, last_name: &str, email: Option<&str>) -> User {
    User {
        id,
        email: email.map(str::to_string),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone_number: None,
        role: "PATIENT".to_string(),
    }
}

pub fn test_specialty(id: SpecialtyId, name: &str) -> Specialty {
    Specialty {
        id,
        name: name.to_string(),
        description: None,
    }
}

pub fn test_doctor(
    id: DoctorId,
    user_id: UserId,
    specialty_id: Option<SpecialtyId>,
    experience_years: Option<u32>,
) -> Doctor {
    Doctor {
        id,
        user_id,
        specialty_id,
        description: None,
        experience_years,
        popularity: 0,
        is_active: true,
    }
}

pub fn test_appointment(
    id: AppointmentId,
    patient_id: UserId,
    doctor_id: DoctorId,
    appointment_date: DateTime<Utc>,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        id,
        patient_id,
        doctor_id,
        appointment_date,
        status,
        notes: None,
        cost: None,
        created_at: appointment_date,
        updated_at: None,
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(id: DoctorId, user_id: UserId, experience_years: Option<u32>, popularity: i32) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "specialty_id": 1,
            "description": "General practitioner",
            "experience_years": experience_years,
            "popularity": popularity,
            "is_active": true
        })
    }

    pub fn appointment_row(id: AppointmentId, patient_id: UserId, doctor_id: DoctorId) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_date": "2024-12-20T10:00:00Z",
            "status": "PENDING",
            "notes": null,
            "cost": null,
            "created_at": "2024-12-01T08:00:00Z",
            "updated_at": null
        })
    }

    pub fn user_row(id: UserId, email: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "email": email,
            "first_name": "Test",
            "last_name": "Patient",
            "phone_number": null,
            "role": "PATIENT"
        })
    }
}

/// Store wrapper that counts writes and consultation-count lookups, and can
/// be told to reject appointment inserts.
pub struct RecordingStore {
    inner: Arc<InMemoryStore>,
    writes: AtomicUsize,
    count_calls: AtomicUsize,
    reject_appointment_inserts: AtomicBool,
}

impl RecordingStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            reject_appointment_inserts: AtomicBool::new(false),
        }
    }

    pub fn reject_appointment_inserts(&self) {
        self.reject_appointment_inserts.store(true, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClinicStore for RecordingStore {
    async fn find_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        self.inner.find_appointment(id).await
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.inner.list_appointments().await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        if self.reject_appointment_inserts.load(Ordering::SeqCst) {
            bail!("appointments table rejected the insert");
        }
        self.record_write();
        self.inner.insert_appointment(appointment).await
    }

    async fn save_appointment(&self, appointment: &Appointment) -> Result<Appointment> {
        self.record_write();
        self.inner.save_appointment(appointment).await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        self.record_write();
        self.inner.delete_appointment(id).await
    }

    async fn count_appointments_by_doctor(&self, doctor_id: DoctorId) -> Result<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.count_appointments_by_doctor(doctor_id).await
    }

    async fn find_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        self.inner.find_doctor(id).await
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.inner.list_doctors().await
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        self.record_write();
        self.inner.insert_doctor(doctor).await
    }

    async fn save_doctor(&self, doctor: &Doctor) -> Result<Doctor> {
        self.record_write();
        self.inner.save_doctor(doctor).await
    }

    async fn save_doctors(&self, doctors: &[Doctor]) -> Result<Vec<Doctor>> {
        self.record_write();
        self.inner.save_doctors(doctors).await
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        self.record_write();
        self.inner.delete_doctor(id).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        self.inner.find_user(id).await
    }

    async fn find_specialty(&self, id: SpecialtyId) -> Result<Option<Specialty>> {
        self.inner.find_specialty(id).await
    }

    async fn find_medical_report(&self, id: MedicalReportId) -> Result<Option<MedicalReport>> {
        self.inner.find_medical_report(id).await
    }

    async fn list_medical_reports(&self) -> Result<Vec<MedicalReport>> {
        self.inner.list_medical_reports().await
    }

    async fn insert_medical_report(&self, report: NewMedicalReport) -> Result<MedicalReport> {
        self.record_write();
        self.inner.insert_medical_report(report).await
    }

    async fn save_medical_report(&self, report: &MedicalReport) -> Result<MedicalReport> {
        self.record_write();
        self.inner.save_medical_report(report).await
    }

    async fn delete_medical_report(&self, id: MedicalReportId) -> Result<()> {
        self.record_write();
        self.inner.delete_medical_report(id).await
    }
}
