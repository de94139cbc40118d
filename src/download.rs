//! Artifact downloading and atomic replacement
//!
//! Bytes are written to a temporary sibling first; the previously installed
//! jar is only removed after the new file is fully on disk, so a failed
//! download never destroys the existing artifact and the target path is
//! never observed half-written.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::config::Settings;
use crate::error::DownloadError;
use crate::report::Reporter;
use crate::resolve::filter::select_archive;

/// A fully buffered download.
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    /// Filename from the `content-disposition` header, when the server sent
    /// one.
    pub disposition_filename: Option<String>,
}

pub struct Downloader<'a> {
    client: &'a reqwest::Client,
    settings: &'a Settings,
    reporter: Reporter,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a reqwest::Client, settings: &'a Settings, reporter: Reporter) -> Self {
        Self {
            client,
            settings,
            reporter,
        }
    }

    /// Fetches a URL into memory, following redirects. Transport errors are
    /// returned for the caller to log; they skip only this plugin.
    /// `github_auth` attaches the configured token, which artifact bundle
    /// downloads require.
    pub async fn fetch(&self, url: &str, github_auth: bool) -> Result<FetchedFile, DownloadError> {
        let mut request = self.client.get(url);
        if github_auth && let Some(token) = &self.settings.github_token {
            request = request
                .header("Accept", "application/vnd.github.v3+json")
                .header("Authorization", format!("token {token}"));
        }

        let response = request.send().await?.error_for_status()?;
        let disposition_filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition);
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedFile {
            bytes,
            disposition_filename,
        })
    }

    /// Downloads one archive and replaces the previously installed jar.
    pub async fn download_archive(
        &self,
        url: &str,
        filename: Option<String>,
        old_jar: Option<&Path>,
    ) -> Result<PathBuf, DownloadError> {
        self.reporter.note(&format!("Downloading {url}"));
        let fetched = self.fetch(url, false).await?;

        // Selector-provided name > content-disposition > URL last segment.
        // A trailing-slash URL leaves the last segment empty; refuse it
        // rather than writing to the plugins path itself.
        let filename = filename
            .or(fetched.disposition_filename)
            .or_else(|| {
                url.rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| DownloadError::NoFilename {
                url: url.to_string(),
            })?;

        let target = self.settings.plugins_path.join(&filename);
        persist(&fetched.bytes, &target, old_jar)?;
        self.reporter
            .success(&format!("Saved to {}", target.display()));
        Ok(target)
    }

    /// Downloads a GitHub Actions artifact bundle, extracts the first
    /// matching archive member and persists it under the member's name.
    pub async fn download_artifact_bundle(
        &self,
        url: &str,
        must_match: Option<&Regex>,
        must_not_match: Option<&Regex>,
        old_jar: Option<&Path>,
    ) -> Result<PathBuf, DownloadError> {
        self.reporter.note("Downloading and extracting artifacts");
        let fetched = self.fetch(url, true).await?;

        let mut bundle = zip::ZipArchive::new(Cursor::new(fetched.bytes))?;
        let member = select_archive(bundle.file_names(), must_match, must_not_match)
            .ok_or(DownloadError::NoArchiveMember)?;
        debug!("extracting bundle member {member}");

        let mut bytes = Vec::new();
        bundle
            .by_name(&member)?
            .read_to_end(&mut bytes)
            .map_err(|source| DownloadError::Io {
                path: PathBuf::from(&member),
                source,
            })?;

        let target = self.settings.plugins_path.join(&member);
        persist(&bytes, &target, old_jar)?;
        self.reporter
            .success(&format!("Extracted to {}", target.display()));
        Ok(target)
    }
}

/// Atomically replaces `target` with `bytes`.
///
/// Write order matters: the temp sibling is written before anything is
/// deleted, `old_jar` removal ignores "does not exist", and the rename into
/// place happens last.
pub fn persist(bytes: &[u8], target: &Path, old_jar: Option<&Path>) -> Result<(), DownloadError> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");
    let temp = target.with_file_name(format!("{file_name}.temp"));

    std::fs::write(&temp, bytes).map_err(|source| DownloadError::Io {
        path: temp.clone(),
        source,
    })?;

    if let Some(old_jar) = old_jar {
        remove_if_exists(old_jar)?;
    }
    remove_if_exists(target)?;

    std::fs::rename(&temp, target).map_err(|source| DownloadError::Io {
        path: target.to_path_buf(),
        source,
    })
}

fn remove_if_exists(path: &Path) -> Result<(), DownloadError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DownloadError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Pulls a filename out of a `content-disposition` header value.
fn filename_from_disposition(value: &str) -> Option<String> {
    let re = Regex::new(r#"filename=([^;]+)"#).ok()?;
    let raw = re.captures(value)?.get(1)?.as_str();
    let cleaned = raw.trim().trim_matches(['"', '\'']);
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn persist_replaces_existing_bytes_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("plugin.jar");
        std::fs::write(&target, b"old bytes").unwrap();

        persist(b"new bytes", &target, None).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new bytes");
        assert!(!dir.path().join("plugin.jar.temp").exists());
    }

    #[test]
    fn persist_removes_the_old_jar() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("plugin-1.0.jar");
        let target = dir.path().join("plugin-1.1.jar");
        std::fs::write(&old, b"old").unwrap();

        persist(b"new", &target, Some(&old)).unwrap();

        assert!(!old.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn persist_ignores_missing_removal_targets() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("plugin.jar");
        let missing = dir.path().join("ghost.jar");

        persist(b"bytes", &target, Some(&missing)).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn trailing_slash_url_without_a_filename_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/downloads/")
            .with_status(200)
            .with_body(b"jar bytes".as_slice())
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let settings = Settings {
            plugins_path: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let client = reqwest::Client::new();
        let downloader = Downloader::new(&client, &settings, Reporter);

        let result = downloader
            .download_archive(&format!("{}/downloads/", server.url()), None, None)
            .await;

        assert!(matches!(result, Err(DownloadError::NoFilename { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn disposition_filename_strips_quotes_and_parameters() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="plugin.jar"; size=1"#),
            Some("plugin.jar".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=plugin.jar"),
            Some("plugin.jar".to_string())
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(r#"filename="""#), None);
    }
}
