use anyhow::Result;
use async_trait::async_trait;

use shared_models::{
    Appointment, AppointmentId, Doctor, DoctorId, MedicalReport, MedicalReportId,
    NewAppointment, NewDoctor, NewMedicalReport, Specialty, SpecialtyId, User, UserId,
};

/// Storage capability consumed by every cell.
///
/// Lookups return `Ok(None)` for a missing id; `Err` is reserved for the
/// backend itself failing. Implementations must give read-after-write
/// consistency within one call sequence, but no cross-call transactions:
/// read-modify-write sequences built on top of this trait are last-write-wins.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    // Appointments
    async fn find_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>>;
    async fn list_appointments(&self) -> Result<Vec<Appointment>>;
    async fn insert_appointment(&self, appointment: NewAppointment) -> Result<Appointment>;
    async fn save_appointment(&self, appointment: &Appointment) -> Result<Appointment>;
    async fn delete_appointment(&self, id: AppointmentId) -> Result<()>;
    async fn count_appointments_by_doctor(&self, doctor_id: DoctorId) -> Result<u64>;

    // Doctors
    async fn find_doctor(&self, id: DoctorId) -> Result<Option<Doctor>>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;
    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor>;
    async fn save_doctor(&self, doctor: &Doctor) -> Result<Doctor>;
    /// Persists every doctor in one write.
    async fn save_doctors(&self, doctors: &[Doctor]) -> Result<Vec<Doctor>>;
    async fn delete_doctor(&self, id: DoctorId) -> Result<()>;

    // Reference data
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;
    async fn find_specialty(&self, id: SpecialtyId) -> Result<Option<Specialty>>;

    // Medical reports
    async fn find_medical_report(&self, id: MedicalReportId) -> Result<Option<MedicalReport>>;
    async fn list_medical_reports(&self) -> Result<Vec<MedicalReport>>;
    async fn insert_medical_report(&self, report: NewMedicalReport) -> Result<MedicalReport>;
    async fn save_medical_report(&self, report: &MedicalReport) -> Result<MedicalReport>;
    async fn delete_medical_report(&self, id: MedicalReportId) -> Result<()>;
}
