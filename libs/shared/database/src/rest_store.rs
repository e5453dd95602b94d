use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::{
    Appointment, AppointmentId, Doctor, DoctorId, MedicalReport, MedicalReportId,
    NewAppointment, NewDoctor, NewMedicalReport, Specialty, SpecialtyId, User, UserId,
};

use crate::store::ClinicStore;
use crate::supabase::SupabaseClient;

const APPOINTMENTS: &str = "/rest/v1/appointments";
const DOCTORS: &str = "/rest/v1/doctors";
const USERS: &str = "/rest/v1/users";
const SPECIALTIES: &str = "/rest/v1/specialties";
const MEDICAL_REPORTS: &str = "/rest/v1/medical_reports";

/// Rows requested per listing page. The server may cap pages lower, so
/// listings advance by the rows actually returned.
const PAGE_SIZE: usize = 1000;

/// `ClinicStore` backed by Supabase's PostgREST API.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn upsert_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );
        headers
    }

    async fn find_by_id<T>(&self, table: &str, id: i64) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}?id=eq.{}", table, id);
        let rows: Vec<T> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn list<T>(&self, table: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut rows = Vec::new();
        loop {
            let path = format!(
                "{}?order=id.asc&limit={}&offset={}",
                table,
                PAGE_SIZE,
                rows.len()
            );
            let page: Vec<T> = self.supabase.request(Method::GET, &path, None).await?;
            if page.is_empty() {
                break;
            }
            rows.extend(page);
        }
        debug!("Listed {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn insert<T>(&self, table: &str, body: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let rows: Vec<T> = self
            .supabase
            .request_with_headers(Method::POST, table, Some(body), Some(Self::representation_headers()))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Insert into {} returned no rows", table))
    }

    async fn update<T>(&self, table: &str, id: i64, body: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("{}?id=eq.{}", table, id);
        let rows: Vec<T> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(body), Some(Self::representation_headers()))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Update of {} id {} matched no rows", table, id))
    }

    async fn delete(&self, table: &str, id: i64) -> Result<()> {
        let path = format!("{}?id=eq.{}", table, id);
        self.supabase.execute(Method::DELETE, &path).await
    }
}

#[async_trait]
impl ClinicStore for SupabaseStore {
    async fn find_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        self.find_by_id(APPOINTMENTS, id).await
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.list(APPOINTMENTS).await
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        self.insert(APPOINTMENTS, serde_json::to_value(&appointment)?).await
    }

    async fn save_appointment(&self, appointment: &Appointment) -> Result<Appointment> {
        self.update(APPOINTMENTS, appointment.id, serde_json::to_value(appointment)?)
            .await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> Result<()> {
        self.delete(APPOINTMENTS, id).await
    }

    async fn count_appointments_by_doctor(&self, doctor_id: DoctorId) -> Result<u64> {
        let path = format!("{}?doctor_id=eq.{}&select=id", APPOINTMENTS, doctor_id);
        let count = self.supabase.count(&path).await?;
        debug!("Doctor {} has {} appointments", doctor_id, count);
        Ok(count)
    }

    async fn find_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        self.find_by_id(DOCTORS, id).await
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.list(DOCTORS).await
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        self.insert(DOCTORS, serde_json::to_value(&doctor)?).await
    }

    async fn save_doctor(&self, doctor: &Doctor) -> Result<Doctor> {
        self.update(DOCTORS, doctor.id, serde_json::to_value(doctor)?).await
    }

    async fn save_doctors(&self, doctors: &[Doctor]) -> Result<Vec<Doctor>> {
        if doctors.is_empty() {
            return Ok(Vec::new());
        }

        self.supabase
            .request_with_headers(
                Method::POST,
                DOCTORS,
                Some(json!(doctors)),
                Some(Self::upsert_headers()),
            )
            .await
    }

    async fn delete_doctor(&self, id: DoctorId) -> Result<()> {
        self.delete(DOCTORS, id).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        self.find_by_id(USERS, id).await
    }

    async fn find_specialty(&self, id: SpecialtyId) -> Result<Option<Specialty>> {
        self.find_by_id(SPECIALTIES, id).await
    }

    async fn find_medical_report(&self, id: MedicalReportId) -> Result<Option<MedicalReport>> {
        self.find_by_id(MEDICAL_REPORTS, id).await
    }

    async fn list_medical_reports(&self) -> Result<Vec<MedicalReport>> {
        self.list(MEDICAL_REPORTS).await
    }

    async fn insert_medical_report(&self, report: NewMedicalReport) -> Result<MedicalReport> {
        self.insert(MEDICAL_REPORTS, serde_json::to_value(&report)?).await
    }

    async fn save_medical_report(&self, report: &MedicalReport) -> Result<MedicalReport> {
        self.update(MEDICAL_REPORTS, report.id, serde_json::to_value(report)?)
            .await
    }

    async fn delete_medical_report(&self, id: MedicalReportId) -> Result<()> {
        self.delete(MEDICAL_REPORTS, id).await
    }
}
