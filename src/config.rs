use std::time::Duration;
use crate::domain::{error::NotifierError, models::NotifyApiCredentials};

pub const DEFAULT_CONFIG_BUCKET: &str = "datasource-config";
pub const DEFAULT_CONFIG_KEY: &str = "datasources.json";
pub const DEFAULT_TIMER_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_bucket: String,
    pub config_key: String,
    /// Queue of storage events; the queue trigger is disabled when unset.
    pub queue_url: Option<String>,
    pub notify_api: NotifyApiCredentials,
    pub timer: TimerSettings,
}

#[derive(Debug, Clone)]
pub struct TimerSettings {
    pub interval: Duration,
    pub source_ids: Vec<String>,
}

impl TimerSettings {
    pub fn is_enabled(&self) -> bool {
        !self.source_ids.is_empty()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, NotifierError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifierError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| NotifierError::Config(format!("{} environment variable is required", name)))
        };

        let notify_api = NotifyApiCredentials {
            base_url: required("NOTIFY_API_BASE_URL")?,
            api_key: required("NOTIFY_API_KEY")?,
            api_key_secret: required("NOTIFY_API_KEY_SECRET")?,
        };

        let interval_secs = match get("NOTIFY_TIMER_INTERVAL_SECS") {
            Some(value) => value.trim().parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| NotifierError::Config(format!("NOTIFY_TIMER_INTERVAL_SECS must be a positive integer, got '{}'", value)))?,
            None => DEFAULT_TIMER_INTERVAL_SECS,
        };

        let source_ids: Vec<String> = get("NOTIFY_TIMER_SOURCE_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            config_bucket: get("CONFIG_BUCKET").unwrap_or_else(|| DEFAULT_CONFIG_BUCKET.to_string()),
            config_key: get("CONFIG_KEY").unwrap_or_else(|| DEFAULT_CONFIG_KEY.to_string()),
            queue_url: get("SQS_QUEUE_URL"),
            notify_api,
            timer: TimerSettings {
                interval: Duration::from_secs(interval_secs),
                source_ids,
            },
        })
    }
}
