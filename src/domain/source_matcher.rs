use tracing::debug;
use crate::domain::models::SourceRecord;

/// Returns the sources whose storage account, `container/folder` path and
/// optional file extension all occur in `file_url`, in configuration order.
pub fn identify_sources(file_url: &str, sources: &[SourceRecord]) -> Vec<SourceRecord> {
    sources
        .iter()
        .filter(|source| {
            let matched = file_url.contains(source.attributes.storage_account.as_str())
                && file_url.contains(source.source_path().as_str())
                && file_url.contains(source.extension_filter());

            if !matched {
                debug!("Source '{}' does not match url: {}", source.id, file_url);
            }
            matched
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ManifestOptions, SourceAttributes};

    fn source(id: &str, account: &str, container: &str, folder: &str, extension: Option<&str>) -> SourceRecord {
        SourceRecord {
            id: id.to_string(),
            attributes: SourceAttributes {
                storage_account: account.to_string(),
                storage_container: container.to_string(),
                folder_path: folder.to_string(),
                file_extension: extension.map(str::to_string),
                ade_source_system: None,
                ade_source_entity: None,
                single_file_manifest: false,
                manifest: ManifestOptions::default(),
            },
        }
    }

    #[test]
    fn matches_account_path_and_extension() {
        let sources = vec![source("s1", "acct1", "cont1", "path1", Some(".csv"))];

        let matched = identify_sources("https://acct1.blob.core.windows.net/cont1/path1/file.csv", &sources);
        assert_eq!(matched, sources);
    }

    #[test]
    fn extension_mismatch_is_not_matched() {
        let sources = vec![source("s1", "acct1", "cont1", "path1", Some(".csv"))];

        let matched = identify_sources("https://acct1.blob.core.windows.net/cont1/path1/file.json", &sources);
        assert!(matched.is_empty());
    }

    #[test]
    fn missing_extension_matches_any_file() {
        let sources = vec![source("s1", "acct1", "cont1", "path1", None)];

        for url in [
            "https://acct1.blob.core.windows.net/cont1/path1/file.csv",
            "https://acct1.blob.core.windows.net/cont1/path1/file.json",
            "https://acct1.blob.core.windows.net/cont1/path1/noext",
        ] {
            assert_eq!(identify_sources(url, &sources).len(), 1, "url: {}", url);
        }
    }

    #[test]
    fn account_and_path_are_both_required() {
        let sources = vec![source("s1", "acct1", "cont1", "path1", None)];

        assert!(identify_sources("https://acct2.blob.core.windows.net/cont1/path1/f.csv", &sources).is_empty());
        assert!(identify_sources("https://acct1.blob.core.windows.net/cont1/path2/f.csv", &sources).is_empty());
        // container and folder have to be adjacent
        assert!(identify_sources("https://acct1.blob.core.windows.net/cont1/x/path1/f.csv", &sources).is_empty());
    }

    #[test]
    fn empty_configuration_matches_nothing() {
        assert!(identify_sources("https://acct1.blob.core.windows.net/cont1/path1/file.csv", &[]).is_empty());
        assert!(identify_sources("", &[]).is_empty());
    }

    #[test]
    fn duplicates_are_kept_in_configuration_order() {
        let sources = vec![
            source("b", "acct1", "cont1", "path1", Some(".csv")),
            source("skip", "other", "cont1", "path1", None),
            source("a", "acct1", "cont1", "path1", None),
            source("b", "acct1", "cont1", "path1", Some(".csv")),
        ];

        let matched = identify_sources("https://acct1.blob.core.windows.net/cont1/path1/file.csv", &sources);
        let ids: Vec<&str> = matched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "b"]);
    }
}
