use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gtfs_atlas_core::{run, ExportConfig};

#[derive(Debug, Parser)]
#[command(name = "gtfs-atlas")]
#[command(about = "Export GTFS feeds as GeoJSON map layers")]
struct Args {
    /// Agency feed url; repeat for multiple agencies. Output files are named
    /// by the 0-based position of each url.
    #[arg(short = 'u', long = "url", required = true)]
    urls: Vec<String>,

    /// Directory the JSON artifacts are written to.
    #[arg(short = 'o', long = "output", default_value = "public")]
    output: PathBuf,

    /// Per-request timeout for feed downloads, in seconds.
    #[arg(long = "timeout-secs", default_value_t = 120)]
    timeout_secs: u64,

    /// Pretty-print the JSON artifacts.
    #[arg(short = 'p', long = "pretty")]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let mut config = ExportConfig::new(args.urls, args.output);
    config.fetch_timeout = Duration::from_secs(args.timeout_secs);
    config.pretty = args.pretty;

    let summary = run(&config)
        .with_context(|| format!("export to {}", config.output_dir.display()))?;

    info!(
        "wrote {} artifacts, viewport [{:.5}, {:.5}, {:.5}, {:.5}]",
        summary.files.len() + 1,
        summary.bounds[0],
        summary.bounds[1],
        summary.bounds[2],
        summary.bounds[3]
    );
    Ok(())
}
