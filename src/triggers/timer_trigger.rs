use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, error, debug};
use crate::{application::notification_service::NotificationService, config::TimerSettings};

/// Notifies the open manifests of a fixed list of sources on every tick.
pub struct TimerTrigger {
    service: Arc<NotificationService>,
    settings: TimerSettings,
}

impl TimerTrigger {
    pub fn new(service: Arc<NotificationService>, settings: TimerSettings) -> Self {
        Self { service, settings }
    }

    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Starting timer trigger every {:?} for sources: {:?}",
            self.settings.interval, self.settings.source_ids
        );

        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tick_count: u64 = 0;
        loop {
            ticker.tick().await;
            tick_count += 1;
            debug!("Timer tick {}", tick_count);

            if let Err(e) = self.service.notify(&self.settings.source_ids).await {
                error!("Timer tick {} failed: {}", tick_count, e);
            }
        }
    }
}
