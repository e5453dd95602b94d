use std::sync::Arc;

use tracing::{debug, info, instrument};

use shared_database::ClinicStore;
use shared_models::{Doctor, DoctorId};

use crate::models::DoctorError;

pub const EXPERIENCE_WEIGHT: f64 = 0.6;
pub const CONSULTATION_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularityInput {
    pub experience_years: Option<u32>,
    pub consultations: u64,
}

/// Scores each input against the best experience and the busiest schedule
/// in the same batch. Output order matches input order; every score is in
/// 0..=100.
pub fn compute_popularity_scores(inputs: &[PopularityInput]) -> Vec<i32> {
    if inputs.is_empty() {
        return Vec::new();
    }

    let max_experience = inputs
        .iter()
        .map(|input| input.experience_years.unwrap_or(0))
        .max()
        .unwrap_or(0)
        .max(1);
    let max_consultations = inputs
        .iter()
        .map(|input| input.consultations)
        .max()
        .unwrap_or(0)
        .max(1);

    inputs
        .iter()
        .map(|input| {
            let experience_score =
                f64::from(input.experience_years.unwrap_or(0)) / f64::from(max_experience);
            let consultation_score = input.consultations as f64 / max_consultations as f64;

            let combined =
                experience_score * EXPERIENCE_WEIGHT + consultation_score * CONSULTATION_WEIGHT;

            // f64::round is half away from zero; combined is never negative.
            (combined * 100.0).round() as i32
        })
        .collect()
}

/// Owns both writers of `Doctor::popularity`.
///
/// `recompute_all` and `increment_popularity` are not coordinated: a
/// recompute reads every doctor, scores them and writes them back in one
/// batch, so an increment landing between that read and write is lost, and
/// two overlapping recomputes race row by row. Increments are unbounded and
/// may leave a score above 100 until the next recompute.
pub struct PopularityService {
    store: Arc<dyn ClinicStore>,
}

impl PopularityService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Rescores every doctor and persists them in a single batch write.
    /// Does nothing when there are no doctors.
    #[instrument(skip(self))]
    pub async fn recompute_all(&self) -> Result<Vec<Doctor>, DoctorError> {
        let mut doctors = self
            .store
            .list_doctors()
            .await
            .map_err(DoctorError::from_store)?;

        if doctors.is_empty() {
            debug!("No doctors to rescore");
            return Ok(doctors);
        }

        let mut inputs = Vec::with_capacity(doctors.len());
        for doctor in &doctors {
            let consultations = self
                .store
                .count_appointments_by_doctor(doctor.id)
                .await
                .map_err(DoctorError::from_store)?;

            inputs.push(PopularityInput {
                experience_years: doctor.experience_years,
                consultations,
            });
        }

        let scores = compute_popularity_scores(&inputs);
        for (doctor, score) in doctors.iter_mut().zip(scores) {
            doctor.popularity = score;
        }

        let saved = self
            .store
            .save_doctors(&doctors)
            .await
            .map_err(DoctorError::from_store)?;

        info!("Recomputed popularity for {} doctors", saved.len());
        Ok(saved)
    }

    /// Adds one to a doctor's popularity. Not clamped to 100; saturates at
    /// `i32::MAX`.
    #[instrument(skip(self))]
    pub async fn increment_popularity(&self, doctor_id: DoctorId) -> Result<Doctor, DoctorError> {
        let mut doctor = self
            .store
            .find_doctor(doctor_id)
            .await
            .map_err(DoctorError::from_store)?
            .ok_or(DoctorError::NotFound(doctor_id))?;

        doctor.popularity = doctor.popularity.saturating_add(1);

        let saved = self
            .store
            .save_doctor(&doctor)
            .await
            .map_err(DoctorError::from_store)?;

        debug!("Doctor {} popularity is now {}", doctor_id, saved.popularity);
        Ok(saved)
    }
}
