pub mod doctor;
pub mod popularity;

pub use doctor::DoctorService;
pub use popularity::{compute_popularity_scores, PopularityInput, PopularityService};
