//! GTFS feed to GeoJSON export pipeline.
//!
//! Fetches zipped GTFS feeds, reconstructs route geometry from the
//! shapes/trips/routes relations, emits per-agency stop and route layers, and
//! computes the buffered viewport covering all route geometry.

pub mod archive;
pub mod bounds;
pub mod csv_reader;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod geometry;
pub mod pipeline;

pub use archive::FeedArchive;
pub use bounds::{compute_bounds, BOUNDS_BUFFER_MILES};
pub use csv_reader::{parse_table, RawTable};
pub use error::{CsvParseError, ExportError};
pub use feed::GtfsFeed;
pub use fetch::{FeedFetcher, DEFAULT_FETCH_TIMEOUT};
pub use geometry::{build_routes, build_stops, build_trips};
pub use pipeline::{process_feed, run, ExportConfig, ExportSummary};
