use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jarwatch::config::Settings;
use jarwatch::report;

#[derive(Parser)]
#[command(name = "jarwatch")]
#[command(version, about = "Checks plugin archives against upstream sources for updates")]
struct Cli {
    /// Process only this plugin (manifest entry name)
    plugin: Option<String>,

    /// Generate missing plugins.json entries, then exit
    #[arg(short, long)]
    generate: bool,

    /// Path to the settings file
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = Settings::load(&cli.settings).and_then(|settings| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(jarwatch::process::run(settings, cli.plugin, cli.generate))
    });

    if let Err(err) = result {
        report::handle_error(err);
    }
}
