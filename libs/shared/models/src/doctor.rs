use serde::{Deserialize, Serialize};

use crate::user::{SpecialtyId, UserId};

pub type DoctorId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub user_id: UserId,
    pub specialty_id: Option<SpecialtyId>,
    pub description: Option<String>,
    pub experience_years: Option<u32>,
    /// Nominally 0..=100; the per-booking increment may push it above until
    /// the next recompute.
    pub popularity: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub user_id: UserId,
    pub specialty_id: Option<SpecialtyId>,
    pub description: Option<String>,
    pub experience_years: Option<u32>,
    pub popularity: i32,
    pub is_active: bool,
}

impl NewDoctor {
    pub fn with_id(self, id: DoctorId) -> Doctor {
        Doctor {
            id,
            user_id: self.user_id,
            specialty_id: self.specialty_id,
            description: self.description,
            experience_years: self.experience_years,
            popularity: self.popularity,
            is_active: self.is_active,
        }
    }
}
