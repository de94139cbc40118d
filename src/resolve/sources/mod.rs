//! Source metadata fetchers
//!
//! One adapter per upstream distribution source. Each produces a normalized
//! [`Fragment`] from an upstream query; the engine merges them into a
//! [`SourceInfo`](crate::resolve::info::SourceInfo).

pub mod bukkit;
pub mod direct;
pub mod github;
pub mod jenkins;
pub mod spigot;

use crate::error::FetchError;
use crate::manifest::PluginEntry;
use crate::resolve::info::{Fragment, SourceKind};

pub use bukkit::BukkitSource;
pub use direct::DirectSource;
pub use github::GithubSource;
pub use jenkins::JenkinsSource;
pub use spigot::SpigotSource;

/// Trait for querying one upstream source for a plugin's latest metadata.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// The source identifier this adapter handles.
    fn kind(&self) -> SourceKind;

    /// Whether the manifest entry carries the identifier this source needs.
    fn applies(&self, entry: &PluginEntry) -> bool;

    /// Queries the source and builds its fragment.
    ///
    /// `Ok(None)` means the source answered with a semantic error for this
    /// plugin (already reported); resolution continues without a fragment.
    /// Transport errors are returned and abort the whole run.
    async fn fetch(&self, entry: &PluginEntry) -> Result<Option<Fragment>, FetchError>;
}
