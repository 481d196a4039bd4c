use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, error};
use crate::domain::{
    error::NotifierError,
    models::{ManifestOptions, NotifyApiCredentials, SourceRecord},
    ports::ManifestNotifier,
};

const API_KEY_HEADER: &str = "X-API-KEY-ID";
const API_KEY_SECRET_HEADER: &str = "X-API-KEY-SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct NewManifest<'a> {
    state: &'static str,
    #[serde(flatten)]
    options: &'a ManifestOptions,
}

#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    #[serde(rename = "sourceFile")]
    source_file: &'a str,
}

/// Client for the manifest notify REST API.
pub struct NotifyApiClient {
    client: Client,
}

impl NotifyApiClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    fn authorize(request: RequestBuilder, credentials: &NotifyApiCredentials) -> RequestBuilder {
        request
            .header(API_KEY_HEADER, &credentials.api_key)
            .header(API_KEY_SECRET_HEADER, &credentials.api_key_secret)
    }

    async fn send(request: RequestBuilder, action: &str) -> Result<Response, NotifierError> {
        let response = request
            .send()
            .await
            .map_err(|e| {
                error!("Notify api request to {} failed: {}", action, e);
                NotifierError::Api(format!("{}: {}", action, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Notify api returned {} when trying to {}: {}", status, action, body);
            return Err(NotifierError::Api(format!("{} returned {}: {}", action, status, body)));
        }
        Ok(response)
    }

    async fn open_manifests(&self, manifests_url: &Url, credentials: &NotifyApiCredentials) -> Result<Vec<Manifest>, NotifierError> {
        debug!("Listing open manifests: {}", manifests_url);
        let request = self.client.get(manifests_url.clone()).query(&[("state", "OPEN")]);
        let response = Self::send(Self::authorize(request, credentials), "list open manifests").await?;

        response
            .json::<Vec<Manifest>>()
            .await
            .map_err(|e| NotifierError::Parse(format!("invalid manifest listing: {}", e)))
    }

    async fn create_manifest(&self, manifests_url: &Url, source: &SourceRecord, credentials: &NotifyApiCredentials) -> Result<Manifest, NotifierError> {
        debug!("Creating manifest for source {}: {}", source.id, manifests_url);
        let body = NewManifest { state: "OPEN", options: &source.attributes.manifest };
        let request = self.client.post(manifests_url.clone()).json(&body);
        let response = Self::send(Self::authorize(request, credentials), "create manifest").await?;

        let manifest = response
            .json::<Manifest>()
            .await
            .map_err(|e| NotifierError::Parse(format!("invalid manifest: {}", e)))?;
        info!("Created manifest {} for source {}", manifest.id, source.id);
        Ok(manifest)
    }

    async fn add_entry(&self, manifests_url: &Url, manifest: &Manifest, file_url: &str, credentials: &NotifyApiCredentials) -> Result<(), NotifierError> {
        let url = manifest_action_url(manifests_url, &manifest.id, "entries");
        debug!("Adding entry {} to manifest {}", file_url, manifest.id);
        let request = self.client.post(url).json(&ManifestEntry { source_file: file_url });
        Self::send(Self::authorize(request, credentials), "add manifest entry").await?;
        Ok(())
    }

    async fn notify_manifest(&self, manifests_url: &Url, manifest: &Manifest, credentials: &NotifyApiCredentials) -> Result<(), NotifierError> {
        let url = manifest_action_url(manifests_url, &manifest.id, "notify");
        debug!("Notifying manifest {}", manifest.id);
        let request = self.client.post(url);
        Self::send(Self::authorize(request, credentials), "notify manifest").await?;
        Ok(())
    }
}

#[async_trait]
impl ManifestNotifier for NotifyApiClient {
    async fn add_to_manifest(&self, file_url: &str, source: &SourceRecord, credentials: &NotifyApiCredentials) -> Result<(), NotifierError> {
        let url = manifests_url(&credentials.base_url, source)?;

        let manifest = if source.attributes.single_file_manifest {
            self.create_manifest(&url, source, credentials).await?
        } else {
            match self.open_manifests(&url, credentials).await?.into_iter().next() {
                Some(manifest) => {
                    debug!("Using open manifest {} for source {}", manifest.id, source.id);
                    manifest
                }
                None => self.create_manifest(&url, source, credentials).await?,
            }
        };

        self.add_entry(&url, &manifest, file_url, credentials).await?;
        info!("✅ Added {} to manifest {} of source {}", file_url, manifest.id, source.id);

        if source.attributes.single_file_manifest {
            self.notify_manifest(&url, &manifest, credentials).await?;
            info!("Notified single file manifest {} of source {}", manifest.id, source.id);
        }
        Ok(())
    }

    async fn notify_manifests(&self, source: &SourceRecord, credentials: &NotifyApiCredentials) -> Result<(), NotifierError> {
        let url = manifests_url(&credentials.base_url, source)?;

        let manifests = self.open_manifests(&url, credentials).await?;
        if manifests.is_empty() {
            info!("No open manifests for source {}", source.id);
            return Ok(());
        }

        for manifest in &manifests {
            self.notify_manifest(&url, manifest, credentials).await?;
        }
        info!("✅ Notified {} manifests of source {}", manifests.len(), source.id);
        Ok(())
    }
}

/// Collection url of the manifests of a source. Names are percent-encoded as single path segments.
pub fn manifests_url(base_url: &str, source: &SourceRecord) -> Result<Url, NotifierError> {
    let (system, entity) = source.manifest_scope()?;
    let mut url = Url::parse(base_url)
        .map_err(|e| NotifierError::Config(format!("invalid notify api base url '{}': {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| NotifierError::Config(format!("notify api base url '{}' cannot have a path", base_url)))?
        .pop_if_empty()
        .extend(["source-systems", system.as_str(), "source-entities", entity.as_str(), "manifests"]);
    Ok(url)
}

fn manifest_action_url(manifests_url: &Url, manifest_id: &str, action: &str) -> Url {
    let mut url = manifests_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.extend([manifest_id, action]);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::parse_sources;

    fn sources() -> Vec<SourceRecord> {
        parse_sources(br#"[
            {"id": "example_source/example_entity_1", "attributes": {"storage_account": "a", "storage_container": "c", "folder_path": "f",
                "format": "CSV", "compression": "GZIP"}},
            {"id": "plain", "attributes": {"storage_account": "a", "storage_container": "c", "folder_path": "f"}}
        ]"#).unwrap()
    }

    #[test]
    fn builds_manifest_urls() {
        let sources = sources();
        let url = manifests_url("https://notify.example.com/api/", &sources[0]).unwrap();

        assert_eq!(url.as_str(), "https://notify.example.com/api/source-systems/example_source/source-entities/example_entity_1/manifests");
        assert_eq!(manifest_action_url(&url, "m1", "entries").as_str(), format!("{}/m1/entries", url));
        assert_eq!(manifest_action_url(&url, "m1", "notify").as_str(), format!("{}/m1/notify", url));

        let bare = manifests_url("https://notify.example.com", &sources[0]).unwrap();
        assert_eq!(bare.path(), "/source-systems/example_source/source-entities/example_entity_1/manifests");
    }

    #[test]
    fn names_are_encoded_as_single_segments() {
        let source = &parse_sources(br#"[{"id": "x", "attributes": {"storage_account": "a", "storage_container": "c",
            "folder_path": "f", "ade_source_system": "sys", "ade_source_entity": "ent/x"}}]"#).unwrap()[0];

        let url = manifests_url("https://notify.example.com", source).unwrap();
        assert_eq!(url.path(), "/source-systems/sys/source-entities/ent%2Fx/manifests");
        assert_eq!(manifest_action_url(&url, "m/1", "notify").path(), "/source-systems/sys/source-entities/ent%2Fx/manifests/m%2F1/notify");
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let sources = sources();
        assert!(matches!(manifests_url("not a url", &sources[0]), Err(NotifierError::Config(_))));
    }

    #[test]
    fn source_without_scope_is_a_config_error() {
        let sources = sources();
        assert!(matches!(
            manifests_url("https://notify.example.com", &sources[1]),
            Err(NotifierError::Config(_))
        ));
    }

    #[test]
    fn new_manifest_body_carries_options() {
        let sources = sources();
        let body = NewManifest { state: "OPEN", options: &sources[0].attributes.manifest };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"state": "OPEN", "format": "CSV", "compression": "GZIP"}));
    }

    #[test]
    fn entry_body_uses_source_file() {
        let json = serde_json::to_value(ManifestEntry { source_file: "https://a/c/f/x.csv" }).unwrap();
        assert_eq!(json, serde_json::json!({"sourceFile": "https://a/c/f/x.csv"}));
    }
}
