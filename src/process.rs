//! Per-plugin orchestration
//!
//! One plugin is fully resolved and (optionally) downloaded before the next
//! begins; nothing is shared across iterations except the read-only
//! settings. An optional delay between plugins spares the upstream hosts.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::archive::{self, InstalledArtifact};
use crate::config::Settings;
use crate::download::Downloader;
use crate::manifest::{MANIFEST_FILE, Manifest, PluginEntry};
use crate::report::Reporter;
use crate::resolve::engine::ResolutionEngine;
use crate::resolve::precedence::{Download, effective_order, select_download};

pub struct Processor<'a> {
    settings: &'a Settings,
    reporter: Reporter,
    engine: ResolutionEngine,
    downloader: Downloader<'a>,
}

impl<'a> Processor<'a> {
    pub fn new(settings: &'a Settings, client: &'a reqwest::Client, reporter: Reporter) -> Self {
        Self {
            settings,
            reporter,
            engine: ResolutionEngine::new(settings, client, reporter),
            downloader: Downloader::new(client, settings, reporter),
        }
    }

    /// Replaces the production engine, so tests can point the sources at
    /// local servers.
    pub fn with_engine(
        settings: &'a Settings,
        client: &'a reqwest::Client,
        reporter: Reporter,
        engine: ResolutionEngine,
    ) -> Self {
        Self {
            settings,
            reporter,
            engine,
            downloader: Downloader::new(client, settings, reporter),
        }
    }

    /// Processes a single named plugin.
    pub async fn process_one(&self, manifest: &Manifest, name: &str) -> anyhow::Result<()> {
        let artifacts = archive::scan(&self.settings.plugins_path)?;
        let artifact = archive::find(&artifacts, name);

        if artifact.is_none() {
            self.reporter
                .warn(&format!("Couldn't find {name} in the plugins path."));
        }

        let entry = manifest
            .find(name)
            .with_context(|| format!("Couldn't find {name} in {MANIFEST_FILE}"))?;

        self.process_entry(entry, artifact).await
    }

    /// Processes every manifest entry in order.
    pub async fn process_all(&self, manifest: &Manifest) -> anyhow::Result<()> {
        let artifacts = archive::scan(&self.settings.plugins_path)?;

        if artifacts.is_empty() {
            self.reporter
                .warn("Your plugins path doesn't contain any plugins.");
        }
        if manifest.plugins.is_empty() {
            anyhow::bail!("Your {MANIFEST_FILE} file doesn't contain any entries");
        }

        self.reporter
            .step(&format!("Found {} plugin(s) to process.", manifest.plugins.len()));
        self.report_count_mismatch(&artifacts, manifest);

        for (index, entry) in manifest.plugins.iter().enumerate() {
            let artifact = archive::find(&artifacts, &entry.name);
            self.process_entry(entry, artifact).await?;

            if self.settings.delay > 0.0 && index + 1 < manifest.plugins.len() {
                tokio::time::sleep(Duration::from_secs_f64(self.settings.delay)).await;
            }
        }

        Ok(())
    }

    fn report_count_mismatch(&self, artifacts: &[InstalledArtifact], manifest: &Manifest) {
        let jars = artifacts.len();
        let entries = manifest.plugins.len();
        if jars > entries {
            self.reporter.warn(&format!(
                "{} of your plugins don't have {MANIFEST_FILE} entries.",
                jars - entries
            ));
        } else if jars < entries {
            self.reporter.warn(&format!(
                "{} {MANIFEST_FILE} entries do not exist in your plugins path.",
                entries - jars
            ));
        }
    }

    async fn process_entry(
        &self,
        entry: &PluginEntry,
        artifact: Option<&InstalledArtifact>,
    ) -> anyhow::Result<()> {
        self.reporter.step(&format!("Processing {}...", entry.name));

        let installed_version = artifact.and_then(|a| a.version.as_deref());
        if let Some(version) = installed_version {
            self.reporter
                .note(&format!("Current version is {version}"));
        }

        let (info, eligible) = self.engine.resolve(entry, installed_version).await?;

        if !self.settings.auto_downloads {
            return Ok(());
        }

        let order = effective_order(entry, &eligible, self.settings);
        let old_jar = artifact.map(|a| a.path.as_path());

        // Download errors skip this plugin only; the run continues.
        match select_download(&info, entry, &order, self.settings) {
            Some(Download::Archive { url, filename }) => {
                if let Err(e) = self.downloader.download_archive(&url, filename, old_jar).await {
                    self.reporter.error(&e.to_string());
                }
            }
            Some(Download::ArtifactBundle { url }) => {
                let (must_match, must_not_match) = entry
                    .github_filters()
                    .with_context(|| format!("Invalid GitHub filter for {}", entry.name))?;
                if let Err(e) = self
                    .downloader
                    .download_artifact_bundle(
                        &url,
                        must_match.as_ref(),
                        must_not_match.as_ref(),
                        old_jar,
                    )
                    .await
                {
                    self.reporter.error(&e.to_string());
                }
            }
            None => {
                if installed_version.is_some() && eligible.is_empty() {
                    self.reporter.note("You already have the latest version!");
                } else {
                    self.reporter.note("Nothing to download.");
                }
            }
        }

        Ok(())
    }
}

/// Top-level entry point: prepares the plugins directory and the manifest,
/// then dispatches to single-plugin or full processing.
pub async fn run(settings: Settings, plugin: Option<String>, generate: bool) -> anyhow::Result<()> {
    let reporter = Reporter;
    let manifest_path = Path::new(MANIFEST_FILE);

    std::fs::create_dir_all(&settings.plugins_path).with_context(|| {
        format!(
            "Failed to create plugins path {}",
            settings.plugins_path.display()
        )
    })?;

    // No manifest yet: seed one from the discovered archives and stop, so
    // the user can fill in the source identifiers.
    if !manifest_path.exists() {
        reporter.warn(&format!("{MANIFEST_FILE} does not exist!"));
        reporter.note(&format!(
            "Generating from your plugins path ({})...",
            settings.plugins_path.display()
        ));

        let names = installed_names(&settings)?;
        let mut manifest = Manifest::default();
        manifest.add_missing(&names);
        manifest.save(manifest_path)?;

        if manifest.plugins.is_empty() {
            reporter.warn(&format!(
                "I couldn't find any plugins, so {MANIFEST_FILE} won't contain any entries."
            ));
        }
        reporter.step(&format!(
            "Done! Please fill out {MANIFEST_FILE}, then run jarwatch again."
        ));
        return Ok(());
    }

    if generate {
        reporter.step(&format!("Generating missing {MANIFEST_FILE} entries..."));
        let mut manifest = Manifest::load(manifest_path)?;
        let added = manifest.add_missing(&installed_names(&settings)?);
        manifest.save(manifest_path)?;
        reporter.step(&format!("Done! Added {added} entries."));
        return Ok(());
    }

    if settings.auto_downloads {
        reporter.step("Auto-downloads are enabled!");
    } else {
        reporter.step("Auto-downloads are disabled! No changes will be written to disk.");
    }

    let client = reqwest::Client::builder()
        .user_agent(&settings.user_agent)
        .build()
        .context("Failed to build HTTP client")?;
    let manifest = Manifest::load(manifest_path)?;
    let processor = Processor::new(&settings, &client, reporter);

    match plugin {
        Some(name) => processor.process_one(&manifest, &name).await?,
        None => processor.process_all(&manifest).await?,
    }

    reporter.step("All plugins checked.");
    Ok(())
}

fn installed_names(settings: &Settings) -> anyhow::Result<Vec<String>> {
    Ok(archive::scan(&settings.plugins_path)?
        .into_iter()
        .map(|a| a.name)
        .collect())
}
