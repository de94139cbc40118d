//! End-to-end: with a token configured and no releases available, the
//! GitHub Actions artifact bundle is downloaded and one archive member is
//! extracted into the plugins path.

use std::io::{Cursor, Write};

use mockito::{Matcher, Server};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use jarwatch::config::Settings;
use jarwatch::manifest::{Manifest, PluginEntry};
use jarwatch::process::Processor;
use jarwatch::report::Reporter;
use jarwatch::resolve::engine::ResolutionEngine;
use jarwatch::resolve::sources::{GithubSource, Source};

fn artifact_bundle() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("plugin-3.0.jar", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"artifact member bytes").unwrap();
    writer
        .start_file("checksums.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"irrelevant").unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn artifact_bundle_member_is_extracted() {
    let mut server = Server::new_async().await;
    let plugins_dir = TempDir::new().unwrap();

    server
        .mock("GET", "/repos/owner/example/releases")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    server
        .mock("GET", "/repos/owner/example/actions/artifacts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"total_count": 1, "artifacts": [
                {{"expired": false, "archive_download_url": "{}/artifacts/1/zip"}}
            ]}}"#,
            server.url()
        ))
        .create_async()
        .await;
    let bundle = server
        .mock("GET", "/artifacts/1/zip")
        .match_header("authorization", Matcher::Exact("token ghp_test".to_string()))
        .with_status(200)
        .with_body(artifact_bundle())
        .create_async()
        .await;

    let mut entry = PluginEntry::named("Example");
    entry.github_repo = Some("owner/example".to_string());

    let manifest = Manifest {
        plugins: vec![entry],
        ..Manifest::default()
    };
    // The fragment carries no version without releases, so only the
    // force-redownload order reaches it.
    let settings = Settings {
        plugins_path: plugins_dir.path().to_path_buf(),
        auto_downloads: true,
        force_redownload: true,
        github_token: Some("ghp_test".to_string()),
        ..Settings::default()
    };

    let client = reqwest::Client::new();
    let sources: Vec<Box<dyn Source>> = vec![Box::new(GithubSource::new(
        client.clone(),
        &server.url(),
        settings.github_token.clone(),
        Reporter,
    ))];
    let engine = ResolutionEngine::from_sources(Reporter, sources);
    let processor = Processor::with_engine(&settings, &client, Reporter, engine);

    processor.process_one(&manifest, "Example").await.unwrap();

    bundle.assert_async().await;
    let jar = plugins_dir.path().join("plugin-3.0.jar");
    assert_eq!(std::fs::read(&jar).unwrap(), b"artifact member bytes");
    assert!(!plugins_dir.path().join("checksums.txt").exists());
}
