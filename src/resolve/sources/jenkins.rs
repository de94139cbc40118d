//! Jenkins CI-server adapter
//!
//! Queries the last-stable and last-successful build endpoints. When both
//! report the same build number only the stable fragment is kept.

use serde::Deserialize;

use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::resolve::filter::select_archive;
use crate::resolve::info::{Fragment, JenkinsFragment, SourceKind};

use super::Source;

#[derive(Debug, Deserialize)]
struct BuildDetails {
    number: u64,
    #[serde(default)]
    artifacts: Vec<BuildArtifact>,
}

#[derive(Debug, Deserialize)]
struct BuildArtifact {
    #[serde(rename = "relativePath")]
    relative_path: String,
}

pub struct JenkinsSource {
    client: reqwest::Client,
}

impl JenkinsSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn build_details(&self, url: &str) -> Result<BuildDetails, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
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

/// Prepends `https://` unless the configured server already carries a
/// scheme.
fn server_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.to_string()
    } else {
        format!("https://{server}")
    }
}

#[async_trait::async_trait]
impl Source for JenkinsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Jenkins
    }

    fn applies(&self, entry: &PluginEntry) -> bool {
        entry.jenkins_server.is_some()
    }

    async fn fetch(&self, entry: &PluginEntry) -> Result<Option<Fragment>, FetchError> {
        let Some(server) = entry.jenkins_server.as_deref() else {
            return Ok(None);
        };
        let base = server_url(server);
        let (must_match, must_not_match) = entry.jenkins_filters()?;

        let stable = self
            .build_details(&format!("{base}/lastStableBuild/api/json"))
            .await?;
        let stable_url = select_archive(
            stable
                .artifacts
                .iter()
                .map(|a| format!("{base}/lastStableBuild/artifact/{}", a.relative_path)),
            must_match.as_ref(),
            must_not_match.as_ref(),
        );

        let successful = self
            .build_details(&format!("{base}/lastSuccessfulBuild/api/json"))
            .await?;

        // Same build number: stable covers it.
        let successful_url = if successful.number != stable.number {
            select_archive(
                successful
                    .artifacts
                    .iter()
                    .map(|a| format!("{base}/lastSuccessfulBuild/artifact/{}", a.relative_path)),
                must_match.as_ref(),
                must_not_match.as_ref(),
            )
        } else {
            None
        };

        Ok(Some(Fragment::Jenkins(JenkinsFragment {
            stable_url,
            successful_url,
        })))
    }
}
