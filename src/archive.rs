//! Local plugin archives
//!
//! A plugin archive is a zip file (conventionally `.jar`) carrying a
//! `plugin.yml` descriptor with at least a `name:` line and usually a
//! `version:` line. Descriptor problems are fatal for the run; a single
//! unreadable file must not silently produce a partial result set.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;

const DESCRIPTOR_NAME: &str = "plugin.yml";

/// A plugin archive found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct InstalledArtifact {
    pub name: String,
    /// Absent when the descriptor carries no `version:` line.
    pub version: Option<String>,
    pub path: PathBuf,
}

/// Reads the embedded descriptor of one archive.
pub fn read_artifact(path: &Path) -> Result<InstalledArtifact, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
        path: path.to_path_buf(),
        source,
    })?;

    let mut descriptor = String::new();
    archive
        .by_name(DESCRIPTOR_NAME)
        .map_err(|_| ArchiveError::MissingDescriptor {
            path: path.to_path_buf(),
        })?
        .read_to_string(&mut descriptor)
        .map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let name = descriptor_field(&descriptor, "name").ok_or(ArchiveError::UnnamedDescriptor {
        path: path.to_path_buf(),
    })?;
    let version = descriptor_field(&descriptor, "version");

    Ok(InstalledArtifact {
        name,
        version,
        path: path.to_path_buf(),
    })
}

/// Scans a directory for `*.jar` archives and reads each descriptor.
pub fn scan(plugins_dir: &Path) -> Result<Vec<InstalledArtifact>, ArchiveError> {
    let entries = std::fs::read_dir(plugins_dir).map_err(|source| ArchiveError::Io {
        path: plugins_dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "jar"))
        .collect();
    paths.sort();

    paths.iter().map(|path| read_artifact(path)).collect()
}

/// Finds the installed artifact for a plugin, matched case-insensitively on
/// the descriptor name.
pub fn find<'a>(artifacts: &'a [InstalledArtifact], name: &str) -> Option<&'a InstalledArtifact> {
    artifacts
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Extracts a top-level `key: value` line from a YAML-like descriptor,
/// stripping surrounding quotes. Returns `None` for missing or empty values.
fn descriptor_field(descriptor: &str, key: &str) -> Option<String> {
    descriptor.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(key)?;
        let value = rest.strip_prefix(':')?.trim().trim_matches(['\'', '"']);
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_jar(dir: &Path, file_name: &str, descriptor: Option<&str>) -> PathBuf {
        let path = dir.join(file_name);
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        if let Some(descriptor) = descriptor {
            writer
                .start_file(DESCRIPTOR_NAME, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(descriptor.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn reads_name_and_version_from_descriptor() {
        let dir = TempDir::new().unwrap();
        let path = write_jar(
            dir.path(),
            "example.jar",
            Some("name: 'Example'\nversion: \"1.2.0\"\nmain: com.example.Main\n"),
        );

        let artifact = read_artifact(&path).unwrap();
        assert_eq!(artifact.name, "Example");
        assert_eq!(artifact.version.as_deref(), Some("1.2.0"));
        assert_eq!(artifact.path, path);
    }

    #[test]
    fn version_is_optional() {
        let dir = TempDir::new().unwrap();
        let path = write_jar(dir.path(), "example.jar", Some("name: Example\n"));

        let artifact = read_artifact(&path).unwrap();
        assert_eq!(artifact.version, None);
    }

    #[test]
    fn missing_descriptor_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_jar(dir.path(), "example.jar", None);

        assert!(matches!(
            read_artifact(&path),
            Err(ArchiveError::MissingDescriptor { .. })
        ));
    }

    #[test]
    fn non_zip_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"not a zip").unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(ArchiveError::Zip { .. })
        ));
    }

    #[test]
    fn scan_reads_only_jar_files() {
        let dir = TempDir::new().unwrap();
        write_jar(dir.path(), "a.jar", Some("name: A\nversion: 1.0\n"));
        write_jar(dir.path(), "b.jar", Some("name: B\n"));
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let artifacts = scan(dir.path()).unwrap();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].name, "A");
        assert_eq!(artifacts[1].name, "B");
    }

    #[test]
    fn find_matches_case_insensitively() {
        let artifacts = vec![InstalledArtifact {
            name: "Example".to_string(),
            version: None,
            path: PathBuf::from("plugins/example.jar"),
        }];

        assert!(find(&artifacts, "EXAMPLE").is_some());
        assert!(find(&artifacts, "other").is_none());
    }
}
