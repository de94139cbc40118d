//! Per-plugin resolution state: source identifiers and fragments
//!
//! Each upstream source contributes at most one [`Fragment`] per resolution
//! run. Fragments are typed per source; "omit empty" cleanup happens only at
//! the manifest-write boundary, never here.

use serde::{Deserialize, Serialize};

/// Identifier of an upstream distribution source.
///
/// The serialized names match the manifest's `customPrecedence` entries and
/// the `precedence` list in `settings.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    DirectUrls,
    Github,
    Jenkins,
    Spigot,
    Bukkit,
}

impl SourceKind {
    /// Human-readable tag used in console output.
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::DirectUrls => "Direct",
            SourceKind::Github => "GitHub",
            SourceKind::Jenkins => "Jenkins",
            SourceKind::Spigot => "SpigotMC",
            SourceKind::Bukkit => "DevBukkit",
        }
    }

    /// Short tag used in computed filenames.
    pub fn file_tag(self) -> &'static str {
        match self {
            SourceKind::DirectUrls => "direct",
            SourceKind::Github => "github",
            SourceKind::Jenkins => "jenkins",
            SourceKind::Spigot => "spigot",
            SourceKind::Bukkit => "bukkit",
        }
    }
}

/// Configured stable/experimental download URLs. No version awareness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectFragment {
    pub stable_url: Option<String>,
    pub experimental_url: Option<String>,
}

/// Latest marketplace resource version. `download_url` is `None` when the
/// resource is external without a usable URL, or not an archive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpigotFragment {
    pub version: Option<String>,
    pub download_url: Option<String>,
    pub tested_version: Option<String>,
}

/// URL template for the build host's latest file. Carries no version.
#[derive(Debug, Clone, PartialEq)]
pub struct BukkitFragment {
    pub latest_url: String,
}

/// One GitHub release. `url` is `None` when no asset passed the filters;
/// such a release still counts as "has a version" but must not be selected
/// for download.
#[derive(Debug, Clone, PartialEq)]
pub struct GithubRelease {
    pub version: String,
    /// Unix timestamp of `created_at`.
    pub timestamp: i64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GithubFragment {
    pub release: Option<GithubRelease>,
    /// Absent when the stable release supersedes it.
    pub prerelease: Option<GithubRelease>,
    /// Archive URL of the first non-expired Actions artifact.
    pub artifact_url: Option<String>,
}

impl GithubFragment {
    pub fn has_releases(&self) -> bool {
        self.release.is_some() || self.prerelease.is_some()
    }
}

/// Last stable and last successful CI builds. `successful_url` is absent
/// when both endpoints report the same build number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JenkinsFragment {
    pub stable_url: Option<String>,
    pub successful_url: Option<String>,
}

/// One source's contribution to a resolution run.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Direct(DirectFragment),
    Spigot(SpigotFragment),
    Bukkit(BukkitFragment),
    Github(GithubFragment),
    Jenkins(JenkinsFragment),
}

impl Fragment {
    pub fn kind(&self) -> SourceKind {
        match self {
            Fragment::Direct(_) => SourceKind::DirectUrls,
            Fragment::Spigot(_) => SourceKind::Spigot,
            Fragment::Bukkit(_) => SourceKind::Bukkit,
            Fragment::Github(_) => SourceKind::Github,
            Fragment::Jenkins(_) => SourceKind::Jenkins,
        }
    }
}

/// Aggregated per-plugin resolution result, merged from all configured
/// sources. Constructed fresh for every plugin and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub direct: Option<DirectFragment>,
    pub spigot: Option<SpigotFragment>,
    pub bukkit: Option<BukkitFragment>,
    pub github: Option<GithubFragment>,
    pub jenkins: Option<JenkinsFragment>,
}

impl SourceInfo {
    /// Merges one fetched fragment into the aggregate.
    pub fn insert(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Direct(f) => self.direct = Some(f),
            Fragment::Spigot(f) => self.spigot = Some(f),
            Fragment::Bukkit(f) => self.bukkit = Some(f),
            Fragment::Github(f) => self.github = Some(f),
            Fragment::Jenkins(f) => self.jenkins = Some(f),
        }
    }

    /// Whether the given source contributed a fragment this run.
    pub fn contains(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::DirectUrls => self.direct.is_some(),
            SourceKind::Spigot => self.spigot.is_some(),
            SourceKind::Bukkit => self.bukkit.is_some(),
            SourceKind::Github => self.github.is_some(),
            SourceKind::Jenkins => self.jenkins.is_some(),
        }
    }

    /// The display version a source reported, if it reports versions at all.
    ///
    /// GitHub prefers the stable release's version over the prerelease's.
    /// Bukkit and direct URLs never report one.
    pub fn version_of(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Spigot => self.spigot.as_ref()?.version.as_deref(),
            SourceKind::Github => {
                let github = self.github.as_ref()?;
                github
                    .release
                    .as_ref()
                    .or(github.prerelease.as_ref())
                    .map(|r| r.version.as_str())
            }
            SourceKind::DirectUrls | SourceKind::Bukkit | SourceKind::Jenkins => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_serializes_to_manifest_names() {
        let json = serde_json::to_string(&vec![
            SourceKind::DirectUrls,
            SourceKind::Github,
            SourceKind::Jenkins,
            SourceKind::Spigot,
            SourceKind::Bukkit,
        ])
        .unwrap();

        assert_eq!(
            json,
            r#"["directUrls","github","jenkins","spigot","bukkit"]"#
        );
    }

    #[test]
    fn version_of_prefers_stable_release() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Github(GithubFragment {
            release: Some(GithubRelease {
                version: "1.2.0".to_string(),
                timestamp: 100,
                url: None,
            }),
            prerelease: Some(GithubRelease {
                version: "1.3.0-rc1".to_string(),
                timestamp: 200,
                url: None,
            }),
            artifact_url: None,
        }));

        assert_eq!(info.version_of(SourceKind::Github), Some("1.2.0"));
    }

    #[test]
    fn versionless_sources_report_no_version() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Bukkit(BukkitFragment {
            latest_url: "https://dev.bukkit.org/projects/x/files/latest".to_string(),
        }));

        assert!(info.contains(SourceKind::Bukkit));
        assert_eq!(info.version_of(SourceKind::Bukkit), None);
    }
}
