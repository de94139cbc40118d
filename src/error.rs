use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while querying an upstream source.
///
/// Transport, rate-limit and credential failures are fatal to the whole run:
/// later precedence decisions must not be made on incomplete data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited by {host}")]
    RateLimited { host: String },

    #[error("Bad credentials for {host}")]
    BadCredentials { host: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Invalid filter pattern: {0}")]
    BadFilter(#[from] regex::Error),
}

/// Errors raised while reading a local plugin archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid plugin archive: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{path} has no plugin descriptor")]
    MissingDescriptor { path: PathBuf },

    #[error("Descriptor in {path} has no name")]
    UnnamedDescriptor { path: PathBuf },
}

/// Errors raised while downloading or persisting an artifact.
///
/// These are non-fatal: the affected plugin is skipped and the run continues.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Download failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Artifact bundle contains no matching archive member")]
    NoArchiveMember,

    #[error("Couldn't determine a filename for {url}")]
    NoFilename { url: String },

    #[error("Failed to read artifact bundle: {0}")]
    BadBundle(#[from] zip::result::ZipError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
