//! DevBukkit build-host adapter
//!
//! The host exposes no version query; the adapter only builds the
//! latest-file URL template from the configured project slug. The fragment
//! therefore never enters the eligibility list.

use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::resolve::info::{BukkitFragment, Fragment, SourceKind};

use super::Source;

const DEFAULT_BASE_URL: &str = "https://dev.bukkit.org";

pub struct BukkitSource {
    base_url: String,
}

impl BukkitSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl Default for BukkitSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Source for BukkitSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bukkit
    }

    fn applies(&self, entry: &PluginEntry) -> bool {
        entry.bukkit_slug.is_some()
    }

    async fn fetch(&self, entry: &PluginEntry) -> Result<Option<Fragment>, FetchError> {
        let Some(slug) = entry.bukkit_slug.as_deref() else {
            return Ok(None);
        };

        Ok(Some(Fragment::Bukkit(BukkitFragment {
            latest_url: format!("{}/projects/{slug}/files/latest", self.base_url),
        })))
    }
}
