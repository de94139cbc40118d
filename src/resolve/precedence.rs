//! Precedence selector
//!
//! Walks the effective source order and derives the concrete download for
//! the first source that contributed a fragment. A present source that
//! resolves to no URL terminates the search: first precedence hit wins or
//! nothing downloads. That early exit is deliberate, preserved behavior and
//! pinned by a regression test.

use crate::config::Settings;
use crate::manifest::PluginEntry;
use crate::resolve::info::{SourceInfo, SourceKind};

/// A concrete download decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Download {
    /// Fetch the URL and persist the body as one archive file.
    Archive {
        url: String,
        /// Manifest override or fetcher-computed name. `None` falls back to
        /// the content-disposition header, then the URL's last segment.
        filename: Option<String>,
    },
    /// Fetch a GitHub Actions artifact bundle and extract one member.
    ArtifactBundle { url: String },
}

/// Builds the order the selector walks: the per-plugin custom override
/// first (verbatim when custom-only), then the computed order — the full
/// configured precedence under force-redownload, otherwise the eligibility
/// list.
pub fn effective_order(
    entry: &PluginEntry,
    eligibility: &[SourceKind],
    settings: &Settings,
) -> Vec<SourceKind> {
    let computed: &[SourceKind] = if settings.force_redownload {
        &settings.precedence
    } else {
        eligibility
    };

    if entry.custom_precedence.is_empty() {
        return computed.to_vec();
    }
    if entry.custom_precedence_only {
        return entry.custom_precedence.clone();
    }

    let mut order = entry.custom_precedence.clone();
    order.extend_from_slice(computed);
    order
}

/// Picks the download for the first present source in `order`, or `None`
/// when no source is present or the first present source yields no URL.
pub fn select_download(
    info: &SourceInfo,
    entry: &PluginEntry,
    order: &[SourceKind],
    settings: &Settings,
) -> Option<Download> {
    let kind = order.iter().copied().find(|&k| info.contains(k))?;

    let (url, filename) = match kind {
        SourceKind::DirectUrls => {
            let direct = info.direct.as_ref()?;
            let url = if (direct.stable_url.is_some() && settings.prefer_stable)
                || direct.experimental_url.is_none()
            {
                direct.stable_url.clone()
            } else {
                direct.experimental_url.clone()
            };
            (url, None)
        }
        SourceKind::Spigot => {
            let spigot = info.spigot.as_ref()?;
            let filename = spigot
                .version
                .as_deref()
                .map(|v| format!("{}-spigot-{v}.jar", sanitize(&entry.name)));
            (spigot.download_url.clone(), filename)
        }
        SourceKind::Bukkit => {
            let bukkit = info.bukkit.as_ref()?;
            (
                Some(bukkit.latest_url.clone()),
                Some(format!("{}-bukkit.jar", sanitize(&entry.name))),
            )
        }
        SourceKind::Github => {
            let github = info.github.as_ref()?;

            // Actions artifacts need a token; they win when preferred, or
            // when the repo has no releases at all.
            if settings.github_token.is_some()
                && ((github.artifact_url.is_some() && settings.prefer_actions)
                    || !github.has_releases())
            {
                return github
                    .artifact_url
                    .clone()
                    .map(|url| Download::ArtifactBundle { url });
            }

            let release_url = github.release.as_ref().and_then(|r| r.url.clone());
            let prerelease_url = github.prerelease.as_ref().and_then(|r| r.url.clone());
            let url = if release_url.is_some() && (settings.prefer_stable || prerelease_url.is_none())
            {
                release_url
            } else {
                prerelease_url
            };
            (url, None)
        }
        SourceKind::Jenkins => {
            let jenkins = info.jenkins.as_ref()?;
            let url = if (jenkins.stable_url.is_some() && settings.prefer_stable)
                || jenkins.successful_url.is_none()
            {
                jenkins.stable_url.clone()
            } else {
                jenkins.successful_url.clone()
            };
            (url, None)
        }
    };

    // Manifest-level override beats any computed filename.
    let filename = entry.filename.clone().or(filename);
    url.map(|url| Download::Archive { url, filename })
}

/// Strips everything but ASCII alphanumerics from a plugin name.
fn sanitize(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}
