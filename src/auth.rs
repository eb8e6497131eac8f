use tokio::sync::watch;
use tracing::info;

use crate::db::Preferences;
use crate::error::AppError;

/// Logged-in flag shared across the app. This object is the only writer;
/// everything else reads through [`LoginState::subscribe`].
pub struct LoginState {
    prefs: Preferences,
    tx: watch::Sender<bool>,
}

impl LoginState {
    pub async fn load(prefs: Preferences) -> Result<Self, AppError> {
        let logged_in = prefs.is_logged_in().await?;
        let (tx, _) = watch::channel(logged_in);
        Ok(Self { prefs, tx })
    }

    pub fn is_logged_in(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub async fn set_logged_in(&self, logged_in: bool) -> Result<(), AppError> {
        self.prefs.set_logged_in(logged_in).await?;
        self.tx.send_replace(logged_in);
        Ok(())
    }

    /// Forget the login and the selected school.
    pub async fn log_out(&self) -> Result<(), AppError> {
        self.prefs.clear_session().await?;
        self.tx.send_replace(false);
        info!("Logged out");
        Ok(())
    }
}
