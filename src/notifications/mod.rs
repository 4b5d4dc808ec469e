//! Notification gateway
//!
//! Push, SMS and email delivery sit behind a trait so the service layer can
//! be exercised without a live provider. The HTTP implementation posts JSON
//! to the configured provider endpoints and reports failures as structured
//! delivery errors rather than opaque faults.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::config::NotificationConfig;
use crate::errors::{AppError, AppResult};
use crate::models::Job;

#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Push a job notice to a translator's devices
    async fn send_push(&self, recipient: Uuid, job: &Job) -> AppResult<()>;

    /// Send an SMS to a phone number
    async fn send_sms(&self, phone: &str, message: &str) -> AppResult<()>;

    /// Send an email notice
    async fn send_email(&self, email: &str, subject: &str, body: &str) -> AppResult<()>;
}

pub struct HttpNotificationGateway {
    client: reqwest::Client,
    config: NotificationConfig,
}

impl HttpNotificationGateway {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn post(
        &self,
        channel: &str,
        url: &str,
        payload: serde_json::Value,
    ) -> AppResult<()> {
        let mut request = self.client.post(url).json(&payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::delivery(channel, e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::delivery(
                channel,
                format!("provider returned {}", response.status()),
            ));
        }

        debug!("Delivered {} notification via {}", channel, url);
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    async fn send_push(&self, recipient: Uuid, job: &Job) -> AppResult<()> {
        self.post(
            "push",
            &self.config.push_url,
            json!({
                "recipient": recipient,
                "job_id": job.id,
                "status": job.status,
                "from_language": job.from_language,
                "to_language": job.to_language,
                "scheduled_at": job.scheduled_at,
            }),
        )
        .await
    }

    async fn send_sms(&self, phone: &str, message: &str) -> AppResult<()> {
        self.post(
            "sms",
            &self.config.sms_url,
            json!({ "to": phone, "message": message }),
        )
        .await
    }

    async fn send_email(&self, email: &str, subject: &str, body: &str) -> AppResult<()> {
        self.post(
            "email",
            &self.config.email_url,
            json!({ "to": email, "subject": subject, "body": body }),
        )
        .await
    }
}
