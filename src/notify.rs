use async_trait::async_trait;
use notify_rust::Notification;
use tracing::info;

use crate::error::AppError;

/// System notification service.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn is_permission_granted(&self) -> bool;
    /// Ask the user for permission; returns whether it was granted.
    async fn request_permission(&self) -> bool;
    async fn send(&self, title: &str, body: &str) -> Result<(), AppError>;
}

/// Desktop notifications. Desktop sessions do not gate notifications behind
/// a permission prompt.
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn is_permission_granted(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> bool {
        true
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
        let app_name = self.app_name.clone();
        let title = title.to_string();
        let body = body.to_string();

        tokio::task::spawn_blocking(move || {
            Notification::new()
                .appname(&app_name)
                .summary(&title)
                .body(&body)
                .show()
                .map(|_| ())
        })
        .await
        .map_err(|e| AppError::Notification(format!("notification task failed: {}", e)))?
        .map_err(|e| AppError::Notification(e.to_string()))
    }
}

/// Writes notifications to the log, for headless runs.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn is_permission_granted(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> bool {
        true
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
        info!("notification: {} - {}", title, body);
        Ok(())
    }
}
