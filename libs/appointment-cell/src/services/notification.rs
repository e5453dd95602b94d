// libs/appointment-cell/src/services/notification.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::{Appointment, User};

/// What a notifier needs to reach the patient about one appointment.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentNotice {
    pub appointment: Appointment,
    pub patient: Option<User>,
}

impl AppointmentNotice {
    pub fn recipient(&self) -> Option<&str> {
        self.patient.as_ref().and_then(User::contact_email)
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification channel is not configured")]
    NotConfigured,

    #[error("Notification transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification endpoint rejected the message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

/// Outbound patient messaging. Callers treat every error as non-fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_appointment_confirmation(&self, notice: &AppointmentNotice) -> Result<(), NotificationError>;
    async fn send_appointment_cancellation(&self, notice: &AppointmentNotice) -> Result<(), NotificationError>;
}

/// Logs notifications instead of delivering them.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_appointment_confirmation(&self, notice: &AppointmentNotice) -> Result<(), NotificationError> {
        match notice.recipient() {
            Some(email) => info!(
                "Appointment {} confirmation for {} on {}",
                notice.appointment.id, email, notice.appointment.appointment_date
            ),
            None => warn!(
                "Cannot send confirmation for appointment {}: patient or patient email missing",
                notice.appointment.id
            ),
        }
        Ok(())
    }

    async fn send_appointment_cancellation(&self, notice: &AppointmentNotice) -> Result<(), NotificationError> {
        match notice.recipient() {
            Some(email) => info!(
                "Appointment {} cancellation for {}",
                notice.appointment.id, email
            ),
            None => warn!(
                "Cannot send cancellation for appointment {}: patient or patient email missing",
                notice.appointment.id
            ),
        }
        Ok(())
    }
}

/// Posts each notification as a JSON event to a configured URL, where a
/// mail relay renders and delivers it.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    clinic_name: String,
    mail_from: String,
}

impl WebhookNotifier {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_notification_configured() {
            return Err(NotificationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            url: config.notification_webhook_url.clone(),
            clinic_name: config.clinic_name.clone(),
            mail_from: config.mail_from.clone(),
        })
    }

    async fn post_event(&self, event: &str, subject: String, notice: &AppointmentNotice) -> Result<(), NotificationError> {
        let Some(recipient) = notice.recipient() else {
            warn!(
                "Skipping {} for appointment {}: patient or patient email missing",
                event, notice.appointment.id
            );
            return Ok(());
        };

        let notification_id = Uuid::new_v4();
        let patient_name = notice.patient.as_ref().map(User::full_name);
        let body = json!({
            "notification_id": notification_id,
            "event": event,
            "from": self.mail_from,
            "to": recipient,
            "subject": subject,
            "clinic_name": self.clinic_name,
            "patient_name": patient_name,
            "appointment": notice.appointment,
        });

        debug!("Posting {} notification {} to {}", event, notification_id, self.url);

        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Notification endpoint returned {}: {}", status, body);
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Appointment {} {} sent to {}", notice.appointment.id, event, recipient);
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_appointment_confirmation(&self, notice: &AppointmentNotice) -> Result<(), NotificationError> {
        let subject = format!("Appointment Confirmation - {}", self.clinic_name);
        self.post_event("appointment_confirmation", subject, notice).await
    }

    async fn send_appointment_cancellation(&self, notice: &AppointmentNotice) -> Result<(), NotificationError> {
        let subject = format!("Appointment Cancelled - {}", self.clinic_name);
        self.post_event("appointment_cancellation", subject, notice).await
    }
}
