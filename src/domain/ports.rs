use async_trait::async_trait;
use crate::domain::{
    error::NotifierError,
    models::{NotifyApiCredentials, SourceRecord},
};

#[async_trait]
pub trait ConfigurationLoader: Send + Sync {
    async fn load_sources(&self) -> Result<Vec<SourceRecord>, NotifierError>;
}

#[async_trait]
pub trait ManifestNotifier: Send + Sync {
    async fn add_to_manifest(&self, file_url: &str, source: &SourceRecord, credentials: &NotifyApiCredentials) -> Result<(), NotifierError>;

    async fn notify_manifests(&self, source: &SourceRecord, credentials: &NotifyApiCredentials) -> Result<(), NotifierError>;
}
