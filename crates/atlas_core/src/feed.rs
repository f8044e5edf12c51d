use std::collections::BTreeMap;

use gtfs_atlas_model::{parse_coordinate, parse_sequence, Route, ShapePoint, Stop, Trip};
use tracing::debug;

use crate::archive::FeedArchive;
use crate::csv_reader::{parse_table, RawRow, RawTable};
use crate::error::ExportError;

pub const STOPS_FILE: &str = "stops.txt";
pub const ROUTES_FILE: &str = "routes.txt";
pub const TRIPS_FILE: &str = "trips.txt";
pub const SHAPES_FILE: &str = "shapes.txt";

/// The slice of a GTFS feed the geometry export needs, bound into typed
/// records. Rows keep their table's natural read order throughout.
#[derive(Debug, Clone, Default)]
pub struct GtfsFeed {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub shapes: Vec<ShapePoint>,
}

impl GtfsFeed {
    /// Load and bind the export tables. `stops.txt`, `routes.txt`, and
    /// `trips.txt` are required; `shapes.txt` may be absent, in which case
    /// every route falls back to empty geometry downstream.
    pub fn from_archive(archive: &mut FeedArchive) -> Result<Self, ExportError> {
        let stops_table = read_required(archive, STOPS_FILE)?;
        let routes_table = read_required(archive, ROUTES_FILE)?;
        let trips_table = read_required(archive, TRIPS_FILE)?;
        let shapes_table = match archive
            .read_optional(SHAPES_FILE)
            .map_err(|source| ExportError::ArchiveEntry {
                file: SHAPES_FILE,
                source,
            })? {
            Some(data) => Some(parse_table(SHAPES_FILE, &data)?),
            None => {
                debug!("feed has no {SHAPES_FILE}; routes will have empty geometry");
                None
            }
        };

        Ok(Self {
            stops: bind_stops(&stops_table)?,
            routes: bind_routes(&routes_table)?,
            trips: bind_trips(&trips_table)?,
            shapes: match &shapes_table {
                Some(table) => bind_shapes(table)?,
                None => Vec::new(),
            },
        })
    }
}

fn read_required(archive: &mut FeedArchive, file: &'static str) -> Result<RawTable, ExportError> {
    let data = archive
        .read_optional(file)
        .map_err(|source| ExportError::ArchiveEntry { file, source })?
        .ok_or(ExportError::MissingTable(file))?;
    Ok(parse_table(file, &data)?)
}

/// Look up a column the binder cannot do without, failing at bind time
/// rather than on first field access later.
fn require_column(
    table: &RawTable,
    file: &'static str,
    column: &'static str,
) -> Result<usize, ExportError> {
    table
        .column_index(column)
        .ok_or(ExportError::MissingColumn { file, column })
}

fn row_fields(table: &RawTable, row: &RawRow) -> BTreeMap<String, String> {
    table
        .headers
        .iter()
        .zip(&row.fields)
        .map(|(header, value)| (header.clone(), value.clone()))
        .collect()
}

fn bind_stops(table: &RawTable) -> Result<Vec<Stop>, ExportError> {
    let stop_id = require_column(table, STOPS_FILE, "stop_id")?;
    let stop_lat = require_column(table, STOPS_FILE, "stop_lat")?;
    let stop_lon = require_column(table, STOPS_FILE, "stop_lon")?;

    Ok(table
        .rows
        .iter()
        .map(|row| Stop {
            stop_id: table.value(row, stop_id).to_string(),
            stop_lat: table.value(row, stop_lat).to_string(),
            stop_lon: table.value(row, stop_lon).to_string(),
            fields: row_fields(table, row),
        })
        .collect())
}

fn bind_routes(table: &RawTable) -> Result<Vec<Route>, ExportError> {
    let route_id = require_column(table, ROUTES_FILE, "route_id")?;

    Ok(table
        .rows
        .iter()
        .map(|row| Route {
            route_id: table.value(row, route_id).to_string(),
            fields: row_fields(table, row),
        })
        .collect())
}

fn bind_trips(table: &RawTable) -> Result<Vec<Trip>, ExportError> {
    let trip_id = require_column(table, TRIPS_FILE, "trip_id")?;
    let route_id = require_column(table, TRIPS_FILE, "route_id")?;
    let shape_id = table.column_index("shape_id");

    Ok(table
        .rows
        .iter()
        .map(|row| {
            let shape = shape_id
                .map(|index| table.value(row, index).trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            Trip {
                trip_id: table.value(row, trip_id).to_string(),
                route_id: table.value(row, route_id).to_string(),
                shape_id: shape,
                fields: row_fields(table, row),
            }
        })
        .collect())
}

fn bind_shapes(table: &RawTable) -> Result<Vec<ShapePoint>, ExportError> {
    let shape_id = require_column(table, SHAPES_FILE, "shape_id")?;
    let sequence = require_column(table, SHAPES_FILE, "shape_pt_sequence")?;
    let lat = require_column(table, SHAPES_FILE, "shape_pt_lat")?;
    let lon = require_column(table, SHAPES_FILE, "shape_pt_lon")?;

    let mut points = Vec::with_capacity(table.len());
    for row in &table.rows {
        points.push(ShapePoint {
            shape_id: table.value(row, shape_id).to_string(),
            sequence: parse_sequence(table.value(row, sequence)).map_err(|source| {
                ExportError::BadScalar {
                    file: SHAPES_FILE,
                    line: row.line,
                    column: "shape_pt_sequence",
                    source,
                }
            })?,
            lat: parse_coordinate(table.value(row, lat)).map_err(|source| {
                ExportError::BadScalar {
                    file: SHAPES_FILE,
                    line: row.line,
                    column: "shape_pt_lat",
                    source,
                }
            })?,
            lon: parse_coordinate(table.value(row, lon)).map_err(|source| {
                ExportError::BadScalar {
                    file: SHAPES_FILE,
                    line: row.line,
                    column: "shape_pt_lon",
                    source,
                }
            })?,
        });
    }
    Ok(points)
}
