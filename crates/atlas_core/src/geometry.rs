use std::collections::HashMap;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use gtfs_atlas_model::{parse_coordinate, Route, ShapePoint, Stop, Trip};

use crate::error::ExportError;

/// A GeoJSON position: `[lon, lat]`.
type Position = Vec<f64>;

/// One point feature per stop row, in table order.
///
/// A malformed coordinate fails the whole build naming the offending stop;
/// the consuming map cannot render a layer with partial or garbage points.
pub fn build_stops(stops: &[Stop]) -> Result<FeatureCollection, ExportError> {
    let mut features = Vec::with_capacity(stops.len());
    for stop in stops {
        let lon = parse_coordinate(&stop.stop_lon).map_err(|_| ExportError::StopCoordinate {
            stop_id: stop.stop_id.clone(),
            field: "stop_lon",
            value: stop.stop_lon.clone(),
        })?;
        let lat = parse_coordinate(&stop.stop_lat).map_err(|_| ExportError::StopCoordinate {
            stop_id: stop.stop_id.clone(),
            field: "stop_lat",
            value: stop.stop_lat.clone(),
        })?;
        features.push(feature(
            Value::Point(vec![lon, lat]),
            properties(&stop.fields),
        ));
    }
    Ok(collection(features))
}

/// One MultiLineString feature per routes-table row, in table order.
///
/// The geometry wraps the ordered coordinate sequence of the shape referenced
/// by the route's first trip. A route with no trip, or whose shape is absent,
/// is emitted with empty coordinates rather than dropped, so the feature
/// count always equals the routes-table row count.
pub fn build_routes(
    shapes: &[ShapePoint],
    trips: &[Trip],
    routes: &[Route],
) -> FeatureCollection {
    let lines = index_shape_lines(shapes);
    let route_shape = first_shape_per_route(trips);

    let features = routes
        .iter()
        .map(|route| {
            let line = route_shape
                .get(route.route_id.as_str())
                .and_then(|shape_id| lines.get(*shape_id));
            feature(multi_line(line), properties(&route.fields))
        })
        .collect();
    collection(features)
}

/// One MultiLineString feature per trip row carrying that trip's own shape
/// geometry and columns.
pub fn build_trips(shapes: &[ShapePoint], trips: &[Trip]) -> FeatureCollection {
    let lines = index_shape_lines(shapes);

    let features = trips
        .iter()
        .map(|trip| {
            let line = trip
                .shape_id
                .as_deref()
                .and_then(|shape_id| lines.get(shape_id));
            feature(multi_line(line), properties(&trip.fields))
        })
        .collect();
    collection(features)
}

/// Group shape points by shape id and order each group by sequence number.
/// The sort is stable, so points sharing a sequence number keep their
/// original relative row order.
fn index_shape_lines(shapes: &[ShapePoint]) -> HashMap<&str, Vec<Position>> {
    let mut grouped: HashMap<&str, Vec<(u32, Position)>> = HashMap::new();
    for point in shapes {
        grouped
            .entry(point.shape_id.as_str())
            .or_default()
            .push((point.sequence, vec![point.lon, point.lat]));
    }

    grouped
        .into_iter()
        .map(|(shape_id, mut points)| {
            points.sort_by_key(|(sequence, _)| *sequence);
            let line = points.into_iter().map(|(_, position)| position).collect();
            (shape_id, line)
        })
        .collect()
}

/// First-seen-wins trip→shape join: the first trip row (in table order) for a
/// route decides which shape renders it; later trips are ignored.
fn first_shape_per_route(trips: &[Trip]) -> HashMap<&str, &str> {
    let mut map: HashMap<&str, &str> = HashMap::new();
    for trip in trips {
        if let Some(shape_id) = trip.shape_id.as_deref() {
            map.entry(trip.route_id.as_str()).or_insert(shape_id);
        }
    }
    map
}

fn multi_line(line: Option<&Vec<Position>>) -> Value {
    match line {
        Some(line) => Value::MultiLineString(vec![line.clone()]),
        None => Value::MultiLineString(Vec::new()),
    }
}

fn properties(fields: &std::collections::BTreeMap<String, String>) -> JsonObject {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), JsonValue::String(value.clone())))
        .collect()
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
