pub mod appointment;
pub mod doctor;
pub mod error;
pub mod medical_report;
pub mod user;

pub use appointment::*;
pub use doctor::*;
pub use medical_report::*;
pub use user::*;
