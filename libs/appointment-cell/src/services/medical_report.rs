// libs/appointment-cell/src/services/medical_report.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use shared_database::ClinicStore;
use shared_models::{
    Appointment, AppointmentId, DoctorId, MedicalReport, MedicalReportId, NewMedicalReport, UserId,
};

use crate::models::{CreateMedicalReportRequest, MedicalReportError, UpdateMedicalReportRequest};

/// Post-visit reports, at most one per appointment.
pub struct MedicalReportService {
    store: Arc<dyn ClinicStore>,
}

impl MedicalReportService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Files the report for an appointment, rejecting a second one.
    ///
    /// Uniqueness is a lookup followed by an insert, not a store constraint.
    /// Two concurrent creates for the same appointment can both pass the
    /// lookup; both rows are stored and reads resolve to the later one.
    #[instrument(skip(self, request), fields(appointment_id = request.appointment_id))]
    pub async fn create(&self, request: CreateMedicalReportRequest) -> Result<MedicalReport, MedicalReportError> {
        validate_diagnosis(&request.diagnosis)?;
        self.ensure_appointment(request.appointment_id).await?;

        if self.find_for_appointment(request.appointment_id).await?.is_some() {
            return Err(MedicalReportError::AlreadyExists(request.appointment_id));
        }

        let report = self
            .store
            .insert_medical_report(NewMedicalReport {
                appointment_id: request.appointment_id,
                diagnosis: request.diagnosis,
                symptoms: request.symptoms,
                physical_examination: request.physical_examination,
                investigations: request.investigations,
                prescriptions: request.prescriptions,
                recommendations: request.recommendations,
                follow_up_date: request.follow_up_date,
                additional_notes: request.additional_notes,
                created_date: Utc::now(),
            })
            .await
            .map_err(MedicalReportError::from_store)?;

        info!(
            "Medical report {} created with {} prescriptions",
            report.id,
            report.prescriptions.len()
        );
        Ok(report)
    }

    pub async fn list_all(&self) -> Result<Vec<MedicalReport>, MedicalReportError> {
        self.store
            .list_medical_reports()
            .await
            .map_err(MedicalReportError::from_store)
    }

    pub async fn get(&self, report_id: MedicalReportId) -> Result<MedicalReport, MedicalReportError> {
        self.store
            .find_medical_report(report_id)
            .await
            .map_err(MedicalReportError::from_store)?
            .ok_or(MedicalReportError::NotFound(report_id))
    }

    /// `Ok(None)` when the appointment exists but has no report yet.
    pub async fn get_by_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Option<MedicalReport>, MedicalReportError> {
        self.ensure_appointment(appointment_id).await?;
        self.find_for_appointment(appointment_id).await
    }

    pub async fn list_by_patient(&self, patient_id: UserId) -> Result<Vec<MedicalReport>, MedicalReportError> {
        debug!("Listing medical reports for patient {}", patient_id);
        let appointment_ids = self.appointment_ids_where(|a| a.patient_id == patient_id).await?;
        self.reports_for(&appointment_ids).await
    }

    pub async fn list_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<MedicalReport>, MedicalReportError> {
        debug!("Listing medical reports for doctor {}", doctor_id);
        let appointment_ids = self.appointment_ids_where(|a| a.doctor_id == doctor_id).await?;
        self.reports_for(&appointment_ids).await
    }

    /// Prescriptions are replaced only when the request carries them.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        report_id: MedicalReportId,
        request: UpdateMedicalReportRequest,
    ) -> Result<MedicalReport, MedicalReportError> {
        validate_diagnosis(&request.diagnosis)?;
        let mut report = self.get(report_id).await?;

        report.diagnosis = request.diagnosis;
        report.symptoms = request.symptoms;
        report.physical_examination = request.physical_examination;
        report.investigations = request.investigations;
        report.recommendations = request.recommendations;
        report.follow_up_date = request.follow_up_date;
        report.additional_notes = request.additional_notes;
        if let Some(prescriptions) = request.prescriptions {
            report.prescriptions = prescriptions;
        }

        let saved = self
            .store
            .save_medical_report(&report)
            .await
            .map_err(MedicalReportError::from_store)?;

        info!("Medical report {} updated", report_id);
        Ok(saved)
    }

    pub async fn delete(&self, report_id: MedicalReportId) -> Result<(), MedicalReportError> {
        info!("Deleting medical report {}", report_id);
        self.store
            .delete_medical_report(report_id)
            .await
            .map_err(MedicalReportError::from_store)
    }

    async fn ensure_appointment(&self, appointment_id: AppointmentId) -> Result<(), MedicalReportError> {
        self.store
            .find_appointment(appointment_id)
            .await
            .map_err(MedicalReportError::from_store)?
            .map(|_| ())
            .ok_or(MedicalReportError::AppointmentNotFound(appointment_id))
    }

    async fn find_for_appointment(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<Option<MedicalReport>, MedicalReportError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|report| report.appointment_id == appointment_id)
            .max_by_key(|report| report.id))
    }

    async fn appointment_ids_where<F>(&self, keep: F) -> Result<HashSet<AppointmentId>, MedicalReportError>
    where
        F: Fn(&Appointment) -> bool,
    {
        Ok(self
            .store
            .list_appointments()
            .await
            .map_err(MedicalReportError::from_store)?
            .into_iter()
            .filter(|appointment| keep(appointment))
            .map(|appointment| appointment.id)
            .collect())
    }

    /// Newest first.
    async fn reports_for(
        &self,
        appointment_ids: &HashSet<AppointmentId>,
    ) -> Result<Vec<MedicalReport>, MedicalReportError> {
        let mut reports: Vec<MedicalReport> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|report| appointment_ids.contains(&report.appointment_id))
            .collect();
        reports.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        Ok(reports)
    }
}

fn validate_diagnosis(diagnosis: &str) -> Result<(), MedicalReportError> {
    if diagnosis.trim().is_empty() {
        return Err(MedicalReportError::ValidationError(
            "Diagnosis is required".to_string(),
        ));
    }
    Ok(())
}
