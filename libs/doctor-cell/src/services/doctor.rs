use std::sync::Arc;

use tracing::{debug, info};

use shared_database::ClinicStore;
use shared_models::{Doctor, DoctorId, NewDoctor, SpecialtyId, UserId};

use crate::models::{CreateDoctorRequest, DoctorError, UpdateDoctorRequest};
use crate::services::popularity::PopularityService;

/// Doctor directory. The popularity-ranked listings rescore every doctor
/// before reading, so they write as well as read.
pub struct DoctorService {
    store: Arc<dyn ClinicStore>,
    popularity: Arc<PopularityService>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn ClinicStore>, popularity: Arc<PopularityService>) -> Self {
        Self { store, popularity }
    }

    pub fn popularity(&self) -> &PopularityService {
        &self.popularity
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for user {}", request.user_id);

        let doctor = self
            .store
            .insert_doctor(NewDoctor {
                user_id: request.user_id,
                specialty_id: request.specialty_id,
                description: request.description,
                experience_years: request.experience_years,
                popularity: 0,
                is_active: request.is_active.unwrap_or(true),
            })
            .await
            .map_err(DoctorError::from_store)?;

        info!("Doctor profile created with ID: {}", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: DoctorId) -> Result<Doctor, DoctorError> {
        self.store
            .find_doctor(doctor_id)
            .await
            .map_err(DoctorError::from_store)?
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub async fn get_doctor_by_user_id(&self, user_id: UserId) -> Result<Option<Doctor>, DoctorError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|doctor| doctor.user_id == user_id))
    }

    /// Every doctor, freshly rescored.
    pub async fn list_all(&self) -> Result<Vec<Doctor>, DoctorError> {
        self.popularity.recompute_all().await?;
        self.load_all().await
    }

    pub async fn list_active(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|doctor| doctor.is_active)
            .collect())
    }

    pub async fn list_by_specialty(&self, specialty_id: SpecialtyId) -> Result<Vec<Doctor>, DoctorError> {
        self.ensure_specialty(specialty_id).await?;

        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|doctor| doctor.specialty_id == Some(specialty_id))
            .collect())
    }

    pub async fn list_by_specialty_ordered_by_popularity(
        &self,
        specialty_id: SpecialtyId,
    ) -> Result<Vec<Doctor>, DoctorError> {
        self.ranked_by_specialty(specialty_id, false).await
    }

    pub async fn list_active_by_specialty_ordered_by_popularity(
        &self,
        specialty_id: SpecialtyId,
    ) -> Result<Vec<Doctor>, DoctorError> {
        self.ranked_by_specialty(specialty_id, true).await
    }

    pub async fn update_doctor(
        &self,
        doctor_id: DoctorId,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        let mut doctor = self.get_doctor(doctor_id).await?;
        doctor.specialty_id = request.specialty_id;
        doctor.description = request.description;
        doctor.experience_years = request.experience_years;
        doctor.is_active = request.is_active;

        self.store
            .save_doctor(&doctor)
            .await
            .map_err(DoctorError::from_store)
    }

    pub async fn toggle_status(&self, doctor_id: DoctorId) -> Result<Doctor, DoctorError> {
        let mut doctor = self.get_doctor(doctor_id).await?;
        doctor.is_active = !doctor.is_active;

        info!("Doctor {} active flag set to {}", doctor_id, doctor.is_active);
        self.store
            .save_doctor(&doctor)
            .await
            .map_err(DoctorError::from_store)
    }

    pub async fn delete_doctor(&self, doctor_id: DoctorId) -> Result<(), DoctorError> {
        info!("Deleting doctor {}", doctor_id);
        self.store
            .delete_doctor(doctor_id)
            .await
            .map_err(DoctorError::from_store)
    }

    async fn ranked_by_specialty(
        &self,
        specialty_id: SpecialtyId,
        active_only: bool,
    ) -> Result<Vec<Doctor>, DoctorError> {
        self.ensure_specialty(specialty_id).await?;
        self.popularity.recompute_all().await?;

        let mut doctors: Vec<Doctor> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|doctor| doctor.specialty_id == Some(specialty_id))
            .filter(|doctor| !active_only || doctor.is_active)
            .collect();

        doctors.sort_by(|a, b| b.popularity.cmp(&a.popularity).then(a.id.cmp(&b.id)));
        Ok(doctors)
    }

    async fn ensure_specialty(&self, specialty_id: SpecialtyId) -> Result<(), DoctorError> {
        self.store
            .find_specialty(specialty_id)
            .await
            .map_err(DoctorError::from_store)?
            .map(|_| ())
            .ok_or(DoctorError::SpecialtyNotFound(specialty_id))
    }

    async fn load_all(&self) -> Result<Vec<Doctor>, DoctorError> {
        self.store.list_doctors().await.map_err(DoctorError::from_store)
    }
}
