pub mod aggregator;
pub mod monthly_report;

pub use aggregator::{aggregate_month, DoctorProfile, MonthWindow};
pub use monthly_report::MonthlyReportService;
