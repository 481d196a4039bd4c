use std::sync::Arc;
use tracing::{info, debug, error};
use crate::domain::{
    error::NotifierError,
    models::NotifyApiCredentials,
    ports::{ConfigurationLoader, ManifestNotifier},
    source_matcher::identify_sources,
};

pub struct NotificationService {
    config_loader: Arc<dyn ConfigurationLoader>,
    notifier: Arc<dyn ManifestNotifier>,
    credentials: NotifyApiCredentials,
}

impl NotificationService {
    pub fn new(
        config_loader: Arc<dyn ConfigurationLoader>,
        notifier: Arc<dyn ManifestNotifier>,
        credentials: NotifyApiCredentials,
    ) -> Self {
        Self {
            config_loader,
            notifier,
            credentials,
        }
    }

    /// Adds a newly created file to the manifests of every matching source.
    ///
    /// Returns how many sources the file was added for; zero is a normal outcome.
    pub async fn add_to_manifests(&self, event_url: &str) -> Result<usize, NotifierError> {
        info!("Processing created file: {}", event_url);

        // Step 1: Load data source configuration
        debug!("Step 1: Loading data source configuration");
        let config = self.config_loader.load_sources().await
            .map_err(|e| {
                error!("Failed to load data source configuration: {}", e);
                e
            })?;
        debug!("Loaded {} data sources", config.len());

        // Step 2: Identify sources
        debug!("Step 2: Identifying sources for url: {}", event_url);
        let sources = identify_sources(event_url, &config);
        if sources.is_empty() {
            info!("Source not identified for url: {}", event_url);
            return Ok(0);
        }
        info!("Identified {} sources for url: {}", sources.len(), event_url);

        // Step 3: Add file to manifests
        for source in &sources {
            info!("Processing source: {}", source.id);
            self.notifier.add_to_manifest(event_url, source, &self.credentials).await
                .map_err(|e| {
                    error!("Failed to add {} to manifest of source {}: {}", event_url, source.id, e);
                    e
                })?;
        }

        info!("✅ Added {} to manifests of {} sources", event_url, sources.len());
        Ok(sources.len())
    }

    /// Notifies open manifests of the given source ids.
    ///
    /// Only the first configured source with a given id is notified; unknown ids are skipped.
    /// Returns the number of sources notified.
    pub async fn notify(&self, source_ids: &[String]) -> Result<usize, NotifierError> {
        debug!("Notifying {} source ids", source_ids.len());

        let config = self.config_loader.load_sources().await
            .map_err(|e| {
                error!("Failed to load data source configuration: {}", e);
                e
            })?;

        let mut notified = 0;
        for source_id in source_ids {
            let Some(source) = config.iter().find(|source| &source.id == source_id) else {
                debug!("No configured source for id: {}", source_id);
                continue;
            };

            info!("Notifying source: {}", source.id);
            self.notifier.notify_manifests(source, &self.credentials).await
                .map_err(|e| {
                    error!("Failed to notify source {}: {}", source.id, e);
                    e
                })?;
            notified += 1;
        }

        info!("Notified {} of {} requested sources", notified, source_ids.len());
        Ok(notified)
    }
}
