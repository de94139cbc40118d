//! GitHub release-host adapter
//!
//! Queries the releases list and the Actions artifacts list. Release assets
//! pass through the archive filter; the first non-expired artifact's archive
//! URL is recorded separately and only consulted by the selector when CI
//! artifacts are preferred or no release URL exists.

use chrono::DateTime;
use serde::Deserialize;
use tracing::warn;

use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::report::Reporter;
use crate::resolve::filter::select_archive;
use crate::resolve::info::{Fragment, GithubFragment, GithubRelease, SourceKind};

use super::Source;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    prerelease: bool,
    created_at: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    browser_download_url: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactList {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    expired: bool,
    archive_download_url: String,
}

pub struct GithubSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    reporter: Reporter,
}

impl GithubSource {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        token: Option<String>,
        reporter: Reporter,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            token,
            reporter,
        }
    }

    pub fn github_com(client: reqwest::Client, token: Option<String>, reporter: Reporter) -> Self {
        Self::new(client, DEFAULT_BASE_URL, token, reporter)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::BadCredentials {
                host: "GitHub".to_string(),
            });
        }
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(FetchError::RateLimited {
                host: "GitHub".to_string(),
            });
        }
        if !status.is_success() {
            warn!("GitHub API returned status {status}: {url}");
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

    fn release_fragment(
        &self,
        release: &Release,
        entry: &PluginEntry,
    ) -> Result<GithubRelease, FetchError> {
        let (must_match, must_not_match) = entry.github_filters()?;
        let urls: Vec<&str> = release
            .assets
            .iter()
            .map(|a| a.browser_download_url.as_str())
            .collect();

        let timestamp = DateTime::parse_from_rfc3339(&release.created_at)
            .map_err(|e| FetchError::InvalidResponse {
                url: format!("{}/releases", self.base_url),
                reason: format!("Bad release timestamp {}: {e}", release.created_at),
            })?
            .timestamp();

        Ok(GithubRelease {
            version: release
                .tag_name
                .strip_prefix('v')
                .unwrap_or(&release.tag_name)
                .to_string(),
            timestamp,
            url: select_archive(urls, must_match.as_ref(), must_not_match.as_ref()),
        })
    }
}

#[async_trait::async_trait]
impl Source for GithubSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Github
    }

    fn applies(&self, entry: &PluginEntry) -> bool {
        entry.github_repo.is_some()
    }

    async fn fetch(&self, entry: &PluginEntry) -> Result<Option<Fragment>, FetchError> {
        let Some(repo) = entry.github_repo.as_deref() else {
            return Ok(None);
        };
        let repo_url = format!("{}/repos/{repo}", self.base_url);

        let releases: Vec<Release> = self.get_json(&format!("{repo_url}/releases")).await?;

        // First stable and first prerelease in API order (newest first).
        // When the latest one carries no assets, nothing is recorded for
        // that channel; older releases are never considered.
        let release = releases
            .iter()
            .find(|r| !r.prerelease)
            .filter(|r| !r.assets.is_empty())
            .map(|r| self.release_fragment(r, entry))
            .transpose()?;
        let mut prerelease = releases
            .iter()
            .find(|r| r.prerelease)
            .filter(|r| !r.assets.is_empty())
            .map(|r| self.release_fragment(r, entry))
            .transpose()?;

        // A stable release created after the prerelease supersedes it.
        if let (Some(stable), Some(pre)) = (&release, &prerelease)
            && stable.timestamp > pre.timestamp
        {
            self.reporter.source(
                SourceKind::Github,
                "Latest stable release is more recent than latest pre-release",
            );
            prerelease = None;
        }

        let artifacts: ArtifactList = self
            .get_json(&format!("{repo_url}/actions/artifacts"))
            .await?;
        let artifact_url = artifacts
            .artifacts
            .iter()
            .find(|a| !a.expired)
            .map(|a| a.archive_download_url.clone());

        // Nothing to offer at all: stay absent so later sources in the
        // precedence order still get a chance.
        if release.is_none() && prerelease.is_none() && artifact_url.is_none() {
            self.reporter.source_warn(
                SourceKind::Github,
                "No usable releases or artifacts were found",
            );
            return Ok(None);
        }

        Ok(Some(Fragment::Github(GithubFragment {
            release,
            prerelease,
            artifact_url,
        })))
    }
}
