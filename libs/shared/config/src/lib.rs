use std::env;
use tracing::warn;

const DEFAULT_NOTIFICATION_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_name: String,
    pub mail_from: String,
    pub notification_webhook_url: String,
    pub notification_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            clinic_name: env::var("CLINIC_NAME")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_NAME not set, using default");
                    "Clinic".to_string()
                }),
            mail_from: env::var("CLINIC_MAIL_FROM")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_MAIL_FROM not set, using empty value");
                    String::new()
                }),
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .unwrap_or_else(|_| {
                    warn!("NOTIFICATION_WEBHOOK_URL not set, notifications will only be logged");
                    String::new()
                }),
            notification_timeout_seconds: env::var("NOTIFICATION_TIMEOUT_SECONDS")
                .ok()
                .and_then(|raw| match raw.parse::<u64>() {
                    Ok(seconds) => Some(seconds),
                    Err(_) => {
                        warn!("NOTIFICATION_TIMEOUT_SECONDS is not a number: {}", raw);
                        None
                    }
                })
                .unwrap_or(DEFAULT_NOTIFICATION_TIMEOUT_SECONDS),
        };

        if !config.is_configured() {
            warn!("Store not configured - falling back to in-memory storage");
        }

        config
    }

    /// Whether the PostgREST store has enough settings to connect.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_notification_configured(&self) -> bool {
        !self.notification_webhook_url.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            clinic_name: "Clinic".to_string(),
            mail_from: String::new(),
            notification_webhook_url: String::new(),
            notification_timeout_seconds: DEFAULT_NOTIFICATION_TIMEOUT_SECONDS,
        }
    }
}
