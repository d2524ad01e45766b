use std::{
    path::PathBuf,
    time::Duration,
};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8091";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_WINNERS_POLL_SECS: u64 = 30;
pub const DEFAULT_TICK_MILLIS: u64 = 60;

/// Who is playing and in which activity. Fixed for the lifetime of the
/// process.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub activity_id: i64,
}

#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    #[error("no user id configured; pass --user-id")]
    MissingUser,
    #[error("no activity id configured; pass --activity-id")]
    MissingActivity,
}

impl Session {
    pub fn new(user_id: impl Into<String>, activity_id: i64) -> Self {
        Self {
            user_id: user_id.into().trim().to_string(),
            activity_id,
        }
    }

    pub fn require_user(&self) -> Result<&str, SessionError> {
        if self.user_id.is_empty() {
            Err(SessionError::MissingUser)
        } else {
            Ok(&self.user_id)
        }
    }

    pub fn require_activity(&self) -> Result<i64, SessionError> {
        if self.activity_id == 0 {
            Err(SessionError::MissingActivity)
        } else {
            Ok(self.activity_id)
        }
    }

    pub fn require_complete(&self) -> Result<(), SessionError> {
        self.require_user()?;
        self.require_activity()?;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.require_complete().is_ok()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub session: Session,
    pub log_dir: PathBuf,
    pub winners_poll_interval: Duration,
    pub tick_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: DEFAULT_API_URL.to_string(),
            session: Session::default(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            winners_poll_interval: Duration::from_secs(DEFAULT_WINNERS_POLL_SECS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MILLIS),
        }
    }
}

/// Expands `~` and environment variables in a user supplied directory.
pub fn resolve_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(raw).map_or_else(
        |_| raw.to_string(),
        |expanded| expanded.into_owned(),
    ))
}
