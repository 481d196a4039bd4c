use async_trait::async_trait;
use aws_sdk_s3::Client;
use tracing::{debug, info, error};
use crate::domain::{
    error::NotifierError,
    models::{parse_sources, SourceRecord},
    ports::ConfigurationLoader,
};

/// Reads the data source configuration document from an S3 object on every call.
pub struct S3ConfigurationLoader {
    client: Client,
    bucket: String,
    key: String,
}

impl S3ConfigurationLoader {
    pub fn new(client: Client, bucket: String, key: String) -> Self {
        debug!("Initializing S3 configuration loader for s3://{}/{}", bucket, key);
        Self { client, bucket, key }
    }
}

#[async_trait]
impl ConfigurationLoader for S3ConfigurationLoader {
    async fn load_sources(&self) -> Result<Vec<SourceRecord>, NotifierError> {
        debug!("Fetching configuration s3://{}/{}", self.bucket, self.key);

        let response = self.client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch configuration s3://{}/{}: {}", self.bucket, self.key, e);
                NotifierError::Storage(e.to_string())
            })?;

        let bytes = response.body
            .collect()
            .await
            .map_err(|e| {
                error!("Failed to read configuration body: {}", e);
                NotifierError::Storage(e.to_string())
            })?
            .into_bytes();
        debug!("Read {} bytes of configuration", bytes.len());

        let sources = parse_sources(&bytes)
            .map_err(|e| {
                error!("Configuration s3://{}/{} is invalid: {}", self.bucket, self.key, e);
                e
            })?;

        info!("Loaded {} data sources from s3://{}/{}", sources.len(), self.bucket, self.key);
        Ok(sources)
    }
}
