pub mod lifecycle;
pub mod medical_report;
pub mod notification;
pub mod query;

pub use lifecycle::AppointmentLifecycleService;
pub use medical_report::MedicalReportService;
pub use notification::{
    AppointmentNotice, NotificationError, Notifier, TracingNotifier, WebhookNotifier,
};
pub use query::AppointmentQueryService;
