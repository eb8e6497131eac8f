use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::info;

use crate::error::AppError;
use crate::models::{ClassSession, IsoWeek};

/// Remote timetable provider. Returns the raw JSON text for one week.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_week(&self, school_id: &str, week: IsoWeek) -> Result<String, AppError>;
}

pub struct HttpScheduleSource {
    client: Client,
    base_url: String,
}

impl HttpScheduleSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn schedule_url(&self, school_id: &str, week: IsoWeek) -> Result<Url, AppError> {
        let endpoint = format!("{}/schedule", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &endpoint,
            &[("school_id", school_id.to_string()), ("week", week.to_string())],
        )
        .map_err(|e| AppError::Config(format!("Invalid schedule source url: {}", e)))
    }
}

#[async_trait]
impl ScheduleSource for HttpScheduleSource {
    async fn fetch_week(&self, school_id: &str, week: IsoWeek) -> Result<String, AppError> {
        let url = self.schedule_url(school_id, week)?;
        info!("Fetching schedule for week {} from {}", week, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("schedule request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!("schedule source error {}: {}", status, body)));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("failed to read schedule response: {}", e)))
    }
}

/// Decode a fetch payload. Anything but a JSON array of session records is
/// rejected.
pub fn parse_schedule_response(body: &str) -> Result<Vec<ClassSession>, AppError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AppError::MalformedResponse(format!("response is not JSON: {}", e)))?;

    if !value.is_array() {
        return Err(AppError::MalformedResponse(
            "response is not an array".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::MalformedResponse(format!("invalid session record: {}", e)))
}
