//! SpigotMC marketplace adapter (Spiget API)

use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::report::Reporter;
use crate::resolve::info::{Fragment, SourceKind, SpigotFragment};

use super::Source;

const DEFAULT_BASE_URL: &str = "https://api.spiget.org/v2";

/// Resource details from the Spiget API. An `error` field means the
/// configured resource id is not valid.
#[derive(Debug, Deserialize)]
struct ResourceDetails {
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "testedVersions")]
    tested_versions: Vec<String>,
    #[serde(default)]
    external: bool,
    #[serde(default)]
    file: Option<ResourceFile>,
}

#[derive(Debug, Deserialize)]
struct ResourceFile {
    #[serde(rename = "type")]
    file_type: Option<String>,
    #[serde(rename = "externalUrl")]
    external_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestVersion {
    name: String,
}

pub struct SpigotSource {
    client: reqwest::Client,
    base_url: String,
    reporter: Reporter,
}

impl SpigotSource {
    pub fn new(client: reqwest::Client, base_url: &str, reporter: Reporter) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            reporter,
        }
    }

    pub fn spiget(client: reqwest::Client, reporter: Reporter) -> Self {
        Self::new(client, DEFAULT_BASE_URL, reporter)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::InvalidResponse {
                url: url.to_string(),
                reason: format!("Unexpected status: {status}"),
            });
        }
        response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl Source for SpigotSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Spigot
    }

    fn applies(&self, entry: &PluginEntry) -> bool {
        entry.spigot_id.is_some()
    }

    async fn fetch(&self, entry: &PluginEntry) -> Result<Option<Fragment>, FetchError> {
        let Some(id) = entry.spigot_id else {
            return Ok(None);
        };
        let resource_url = format!("{}/resources/{id}", self.base_url);

        let details: ResourceDetails = self.get_json(&resource_url).await?;

        // An error payload only invalidates this source for this plugin.
        if let Some(error) = details.error {
            self.reporter
                .source_warn(SourceKind::Spigot, &format!("Error: {error}"));
            return Ok(None);
        }

        let latest: LatestVersion = self
            .get_json(&format!("{resource_url}/versions/latest"))
            .await?;
        let version = latest.name.strip_prefix('v').unwrap_or(&latest.name);

        let download_url = if details.external {
            match details.file.as_ref().and_then(|f| f.external_url.clone()) {
                Some(url) => Some(url),
                None => {
                    self.reporter.source(
                        SourceKind::Spigot,
                        "Download URL redirects to a webpage, auto-download not possible",
                    );
                    None
                }
            }
        } else if is_archive_type(details.file.as_ref()) {
            Some(format!("{resource_url}/download"))
        } else {
            debug!("spigot resource {id} file type is not an archive");
            self.reporter
                .source(SourceKind::Spigot, "Resource file is not an archive");
            None
        };

        Ok(Some(Fragment::Spigot(SpigotFragment {
            version: Some(version.to_string()),
            download_url,
            tested_version: details.tested_versions.last().cloned(),
        })))
    }
}

fn is_archive_type(file: Option<&ResourceFile>) -> bool {
    match file.and_then(|f| f.file_type.as_deref()) {
        Some(file_type) => file_type.ends_with("jar") || file_type.ends_with("zip"),
        // No file block at all: assume the internal download endpoint works.
        None => true,
    }
}
