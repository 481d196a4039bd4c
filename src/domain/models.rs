use serde::{Deserialize, Serialize};
use crate::domain::error::NotifierError;

/// One entry of the data source configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: String,
    pub attributes: SourceAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttributes {
    pub storage_account: String,
    pub storage_container: String,
    pub folder_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ade_source_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ade_source_entity: Option<String>,
    #[serde(default)]
    pub single_file_manifest: bool,
    #[serde(flatten)]
    pub manifest: ManifestOptions,
}

/// Optional manifest settings passed through to the notify API when a manifest is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullscanned: Option<bool>,
}

impl SourceRecord {
    /// `storage_container/folder_path`, the location a file url must contain.
    pub fn source_path(&self) -> String {
        format!("{}/{}", self.attributes.storage_container, self.attributes.folder_path)
    }

    /// Extension filter; absent means every file passes.
    pub fn extension_filter(&self) -> &str {
        self.attributes.file_extension.as_deref().unwrap_or("")
    }

    /// Source system and entity names used to scope manifests.
    ///
    /// Explicit `ade_source_system` / `ade_source_entity` attributes win, otherwise
    /// the id is read as `system/entity`.
    pub fn manifest_scope(&self) -> Result<(String, String), NotifierError> {
        let attributes = &self.attributes;
        if let (Some(system), Some(entity)) = (&attributes.ade_source_system, &attributes.ade_source_entity) {
            return Ok((system.clone(), entity.clone()));
        }

        let (system, entity) = match self.id.split_once('/') {
            Some((system, entity)) if !system.is_empty() && !entity.is_empty() && !entity.contains('/') => (system, entity),
            _ => {
                return Err(NotifierError::Config(format!(
                    "source '{}' has no manifest scope: set ade_source_system and ade_source_entity or use an id of the form system/entity",
                    self.id
                )))
            }
        };

        Ok((
            attributes.ade_source_system.clone().unwrap_or_else(|| system.to_string()),
            attributes.ade_source_entity.clone().unwrap_or_else(|| entity.to_string()),
        ))
    }
}

/// Parses the configuration document (a JSON array of source records).
pub fn parse_sources(bytes: &[u8]) -> Result<Vec<SourceRecord>, NotifierError> {
    serde_json::from_slice(bytes)
        .map_err(|e| NotifierError::Parse(format!("invalid data source configuration: {}", e)))
}

/// Storage event as delivered on the trigger queue; only `data.url` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    pub data: StorageEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEventData {
    pub url: String,
}

impl StorageEvent {
    pub fn from_message(body: &str) -> Result<Self, NotifierError> {
        serde_json::from_str(body).map_err(|e| NotifierError::Event(e.to_string()))
    }
}

/// Credentials and base url of the manifest notify API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyApiCredentials {
    pub base_url: String,
    pub api_key: String,
    pub api_key_secret: String,
}
