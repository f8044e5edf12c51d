use std::path::PathBuf;
use std::time::Duration;

use geojson::FeatureCollection;
use serde::Serialize;
use tracing::info;

use crate::archive::FeedArchive;
use crate::bounds::compute_bounds;
use crate::error::ExportError;
use crate::feed::GtfsFeed;
use crate::fetch::{FeedFetcher, DEFAULT_FETCH_TIMEOUT};
use crate::geometry::{build_routes, build_stops, build_trips};

pub const BOUNDS_ARTIFACT: &str = "bounds.json";
pub const CATALOGUE_ARTIFACT: &str = "catalogue.json";

/// Explicit pipeline configuration, passed into [`run`]. There is no
/// process-wide feed list; callers own this value.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// One agency feed url per agency, processed in order. Output file names
    /// use the 0-based position in this list.
    pub agency_urls: Vec<String>,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    /// Pretty-print the JSON artifacts.
    pub pretty: bool,
}

impl ExportConfig {
    pub fn new(agency_urls: Vec<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            agency_urls,
            output_dir: output_dir.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            pretty: false,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Every artifact file name written, in write order, `catalogue.json`
    /// excluded.
    pub files: Vec<String>,
    /// The buffered `[min_lon, min_lat, max_lon, max_lat]` viewport.
    pub bounds: [f64; 4],
}

/// The three per-agency layers derived from one feed.
#[derive(Debug)]
pub struct AgencyLayers {
    pub stops: FeatureCollection,
    pub routes: FeatureCollection,
    pub trips: FeatureCollection,
}

/// Convert one fetched feed archive into its GeoJSON layers.
pub fn process_feed(url: &str, bytes: Vec<u8>) -> Result<AgencyLayers, ExportError> {
    let mut archive =
        FeedArchive::from_bytes(bytes).map_err(|source| ExportError::Archive {
            url: url.to_string(),
            source,
        })?;
    let feed = GtfsFeed::from_archive(&mut archive)?;
    info!(
        "bound feed: {} stops, {} routes, {} trips, {} shape points",
        feed.stops.len(),
        feed.routes.len(),
        feed.trips.len(),
        feed.shapes.len()
    );

    Ok(AgencyLayers {
        stops: build_stops(&feed.stops)?,
        routes: build_routes(&feed.shapes, &feed.trips, &feed.routes),
        trips: build_trips(&feed.shapes, &feed.trips),
    })
}

/// Run the whole export: for each configured agency url, fetch the feed,
/// build its layers, and write `{i}-stops.json`, `{i}-routes.json`, and
/// `{i}-trips.json`; then write the aggregate `bounds.json` and the
/// `catalogue.json` manifest.
///
/// Agencies are processed sequentially and any failure aborts the batch; the
/// catalogue only ever describes a complete run. It lists exactly the files
/// written by this run, so artifacts left behind by earlier runs are never
/// resurrected.
pub fn run(config: &ExportConfig) -> Result<ExportSummary, ExportError> {
    validate_config(config)?;
    std::fs::create_dir_all(&config.output_dir).map_err(|source| ExportError::Write {
        path: config.output_dir.clone(),
        source,
    })?;

    let fetcher = FeedFetcher::new(config.fetch_timeout)?;
    let mut files = Vec::new();
    let mut route_collections = Vec::new();

    for (index, url) in config.agency_urls.iter().enumerate() {
        info!("processing agency {index}: {url}");
        let bytes = fetcher.fetch(url)?;
        let layers = process_feed(url, bytes)?;

        for (suffix, collection) in [
            ("stops", &layers.stops),
            ("routes", &layers.routes),
            ("trips", &layers.trips),
        ] {
            let name = format!("{index}-{suffix}.json");
            write_artifact(config, &name, collection)?;
            files.push(name);
        }
        route_collections.push(layers.routes);
    }

    let bounds = compute_bounds(&route_collections)?;
    write_artifact(config, BOUNDS_ARTIFACT, &bounds)?;
    files.push(BOUNDS_ARTIFACT.to_string());

    let catalogue = Catalogue {
        files: files.clone(),
    };
    write_artifact(config, CATALOGUE_ARTIFACT, &catalogue)?;
    info!(
        "export complete: {} artifacts in {}",
        files.len() + 1,
        config.output_dir.display()
    );

    Ok(ExportSummary { files, bounds })
}

/// The layer manifest the map front end reads to discover what exists.
#[derive(Debug, Serialize)]
struct Catalogue {
    files: Vec<String>,
}

fn validate_config(config: &ExportConfig) -> Result<(), ExportError> {
    if config.agency_urls.is_empty() {
        return Err(ExportError::NoAgencies);
    }
    for url in &config.agency_urls {
        url::Url::parse(url).map_err(|source| ExportError::InvalidUrl {
            url: url.clone(),
            source,
        })?;
    }
    Ok(())
}

fn write_artifact<T: Serialize>(
    config: &ExportConfig,
    name: &str,
    value: &T,
) -> Result<(), ExportError> {
    let json = if config.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|source| ExportError::Serialize {
        artifact: name.to_string(),
        source,
    })?;

    let path = config.output_dir.join(name);
    std::fs::write(&path, json).map_err(|source| ExportError::Write { path, source })
}
