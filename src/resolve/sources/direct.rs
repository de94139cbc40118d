//! Directly configured download URLs

use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::resolve::info::{DirectFragment, Fragment, SourceKind};

use super::Source;

/// Echoes the manifest's stable/experimental URLs as a fragment. No network
/// call, no version awareness.
#[derive(Debug, Default)]
pub struct DirectSource;

#[async_trait::async_trait]
impl Source for DirectSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DirectUrls
    }

    fn applies(&self, entry: &PluginEntry) -> bool {
        entry.stable_direct_url.is_some() || entry.experimental_direct_url.is_some()
    }

    async fn fetch(&self, entry: &PluginEntry) -> Result<Option<Fragment>, FetchError> {
        Ok(Some(Fragment::Direct(DirectFragment {
            stable_url: entry.stable_direct_url.clone(),
            experimental_url: entry.experimental_direct_url.clone(),
        })))
    }
}
