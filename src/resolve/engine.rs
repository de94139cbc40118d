//! Resolution engine
//!
//! Runs every configured source fetcher for one plugin, merges the
//! fragments into a [`SourceInfo`] and computes the eligibility list: the
//! sources whose reported version is strictly newer than the installed one,
//! ordered newest first with ties broken by the fixed global order.

use crate::config::{DEFAULT_PRECEDENCE, Settings};
use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::report::Reporter;
use crate::resolve::compare::{is_newer, version_tuple};
use crate::resolve::info::{Fragment, SourceInfo, SourceKind};
use crate::resolve::sources::{
    BukkitSource, DirectSource, GithubSource, JenkinsSource, Source, SpigotSource,
};

pub struct ResolutionEngine {
    reporter: Reporter,
    sources: Vec<Box<dyn Source>>,
}

impl ResolutionEngine {
    /// Builds the engine with all five production sources.
    pub fn new(settings: &Settings, client: &reqwest::Client, reporter: Reporter) -> Self {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(DirectSource),
            Box::new(SpigotSource::spiget(client.clone(), reporter)),
            Box::new(BukkitSource::default()),
            Box::new(GithubSource::github_com(
                client.clone(),
                settings.github_token.clone(),
                reporter,
            )),
            Box::new(JenkinsSource::new(client.clone())),
        ];
        Self::from_sources(reporter, sources)
    }

    /// Builds the engine over an explicit source set. Tests use this to
    /// point adapters at local servers.
    pub fn from_sources(reporter: Reporter, sources: Vec<Box<dyn Source>>) -> Self {
        Self { reporter, sources }
    }

    /// Queries every source configured for the entry, sequentially, and
    /// aggregates the fragments. Transport errors abort the run.
    pub async fn resolve(
        &self,
        entry: &PluginEntry,
        installed_version: Option<&str>,
    ) -> Result<(SourceInfo, Vec<SourceKind>), FetchError> {
        let mut info = SourceInfo::default();

        for source in &self.sources {
            if !source.applies(entry) {
                continue;
            }
            if let Some(fragment) = source.fetch(entry).await? {
                self.report_fragment(&fragment, installed_version);
                info.insert(fragment);
            }
        }

        let eligible = eligibility(&info, installed_version);
        Ok((info, eligible))
    }

    fn report_fragment(&self, fragment: &Fragment, installed_version: Option<&str>) {
        let reporter = &self.reporter;
        match fragment {
            Fragment::Direct(_) => {}
            Fragment::Spigot(spigot) => {
                if let Some(version) = &spigot.version {
                    let tested = spigot
                        .tested_version
                        .as_deref()
                        .map(|t| format!(" (tested on {t})"))
                        .unwrap_or_default();
                    if newer_than(installed_version, version) {
                        reporter.source_newer(
                            SourceKind::Spigot,
                            &format!("Fetched more recent version {version}{tested}"),
                        );
                    } else {
                        reporter.source(
                            SourceKind::Spigot,
                            &format!("Fetched latest version {version}{tested}"),
                        );
                    }
                }
            }
            Fragment::Bukkit(_) => {
                reporter.source(SourceKind::Bukkit, "Generated URL");
            }
            Fragment::Github(github) => {
                if let Some(release) = &github.release {
                    if newer_than(installed_version, &release.version) {
                        reporter.source_newer(
                            SourceKind::Github,
                            &format!("Fetched more recent stable release {}", release.version),
                        );
                    } else {
                        reporter.source(
                            SourceKind::Github,
                            &format!("Fetched latest stable release {}", release.version),
                        );
                    }
                }
                if let Some(prerelease) = &github.prerelease {
                    if newer_than(installed_version, &prerelease.version) {
                        reporter.source_newer(
                            SourceKind::Github,
                            &format!("Fetched more recent pre-release {}", prerelease.version),
                        );
                    } else {
                        reporter.source(
                            SourceKind::Github,
                            &format!("Fetched latest pre-release {}", prerelease.version),
                        );
                    }
                }
                if github.artifact_url.is_some() {
                    reporter.source(SourceKind::Github, "Fetched latest artifact");
                }
            }
            Fragment::Jenkins(jenkins) => {
                if jenkins.stable_url.is_some() {
                    reporter.source(SourceKind::Jenkins, "Fetched last stable build");
                }
                if jenkins.successful_url.is_some() {
                    reporter.source(SourceKind::Jenkins, "Fetched last successful build");
                }
            }
        }
    }
}

fn newer_than(installed: Option<&str>, latest: &str) -> bool {
    installed.is_some_and(|current| is_newer(latest, current))
}

/// Computes the eligibility list for an aggregated [`SourceInfo`].
///
/// Only sources reporting a version can be eligible. No installed version
/// means every versioned source is eligible, so a first-time download can
/// proceed. The result is ordered newest-reported-version first; ties keep
/// the fixed global order.
pub fn eligibility(info: &SourceInfo, installed_version: Option<&str>) -> Vec<SourceKind> {
    let mut eligible: Vec<(SourceKind, Vec<u64>)> = Vec::new();

    for kind in DEFAULT_PRECEDENCE {
        let Some(version) = info.version_of(kind) else {
            continue;
        };
        let newer = match installed_version {
            Some(current) => is_newer(version, current),
            None => true,
        };
        if newer {
            eligible.push((kind, version_tuple(version).unwrap_or_default()));
        }
    }

    // Stable sort keeps the fixed-order iteration for equal versions.
    eligible.sort_by(|a, b| b.1.cmp(&a.1));
    eligible.into_iter().map(|(kind, _)| kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::info::{GithubFragment, GithubRelease, SpigotFragment};

    fn github_info(version: &str) -> GithubFragment {
        GithubFragment {
            release: Some(GithubRelease {
                version: version.to_string(),
                timestamp: 0,
                url: Some(format!("https://example.com/plugin-{version}.jar")),
            }),
            prerelease: None,
            artifact_url: None,
        }
    }

    #[test]
    fn eligibility_keeps_only_newer_sources() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Github(github_info("1.2.0")));
        info.insert(Fragment::Spigot(SpigotFragment {
            version: Some("1.0.0".to_string()),
            download_url: None,
            tested_version: None,
        }));

        let eligible = eligibility(&info, Some("1.1.0"));
        assert_eq!(eligible, vec![SourceKind::Github]);
    }

    #[test]
    fn eligibility_orders_by_how_much_newer() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Github(github_info("1.2.0")));
        info.insert(Fragment::Spigot(SpigotFragment {
            version: Some("1.3.0".to_string()),
            download_url: None,
            tested_version: None,
        }));

        let eligible = eligibility(&info, Some("1.1.0"));
        assert_eq!(eligible, vec![SourceKind::Spigot, SourceKind::Github]);
    }

    #[test]
    fn eligibility_ties_fall_back_to_global_order() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Github(github_info("2.0.0")));
        info.insert(Fragment::Spigot(SpigotFragment {
            version: Some("2.0.0".to_string()),
            download_url: None,
            tested_version: None,
        }));

        let eligible = eligibility(&info, Some("1.0.0"));
        // github precedes spigot in the fixed order
        assert_eq!(eligible, vec![SourceKind::Github, SourceKind::Spigot]);
    }

    #[test]
    fn absent_installed_version_makes_versioned_sources_eligible() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Github(github_info("0.1.0")));

        let eligible = eligibility(&info, None);
        assert_eq!(eligible, vec![SourceKind::Github]);
    }

    #[test]
    fn versionless_sources_never_enter_the_list() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Bukkit(crate::resolve::info::BukkitFragment {
            latest_url: "https://dev.bukkit.org/projects/x/files/latest".to_string(),
        }));
        info.insert(Fragment::Jenkins(crate::resolve::info::JenkinsFragment {
            stable_url: Some("https://ci.example.com/artifact/plugin.jar".to_string()),
            successful_url: None,
        }));

        assert!(eligibility(&info, None).is_empty());
    }

    #[test]
    fn unchanged_version_is_not_eligible() {
        let mut info = SourceInfo::default();
        info.insert(Fragment::Github(github_info("1.1.0")));

        assert!(eligibility(&info, Some("1.1.0")).is_empty());
    }
}
