use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::resolve::info::SourceKind;

/// Default User-Agent sent on every upstream request. Some hosts reject
/// requests without a browser-looking agent string.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/102.0.0.0 Safari/537.36";

/// Fixed global source order. Eligibility ties and the force-redownload
/// path both fall back to this ordering.
pub const DEFAULT_PRECEDENCE: [SourceKind; 5] = [
    SourceKind::DirectUrls,
    SourceKind::Github,
    SourceKind::Jenkins,
    SourceKind::Spigot,
    SourceKind::Bukkit,
];

/// Runtime configuration, loaded once from `settings.toml` at startup and
/// passed by reference everywhere. Never mutated after load.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub user_agent: String,
    /// Ordered source list consulted for download decisions.
    pub precedence: Vec<SourceKind>,
    pub plugins_path: PathBuf,
    /// When false, resolution runs but nothing is written to disk.
    pub auto_downloads: bool,
    /// Offer the full global precedence even when no source reports a newer
    /// version.
    pub force_redownload: bool,
    /// Prefer stable releases/builds over prereleases and successful builds.
    pub prefer_stable: bool,
    /// Prefer GitHub Actions artifacts over releases (requires a token).
    pub prefer_actions: bool,
    /// Delay between plugins, in seconds. Politeness toward upstream hosts.
    pub delay: f64,
    pub github_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            precedence: DEFAULT_PRECEDENCE.to_vec(),
            plugins_path: PathBuf::from("plugins"),
            auto_downloads: false,
            force_redownload: false,
            prefer_stable: true,
            prefer_actions: false,
            delay: 0.0,
            github_token: None,
        }
    }
}

impl Settings {
    /// Loads settings from the given TOML file. A missing file yields the
    /// defaults. The GitHub token falls back to the `GITHUB_TOKEN`
    /// environment variable when the file does not set one.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut settings = match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(anyhow::anyhow!("Failed to read {}: {e}", path.display())),
        };

        if settings.github_token.is_none() {
            settings.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        }

        Ok(settings)
    }
}
