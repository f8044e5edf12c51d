use geo::{HaversineDestination, Point};
use geojson::{FeatureCollection, Value};

use crate::error::ExportError;

/// Ground-distance margin added around the raw route envelope. The front end
/// uses the result as its initial viewport, so a little breathing room keeps
/// terminal stops off the screen edge.
pub const BOUNDS_BUFFER_MILES: f64 = 5.0;

const METERS_PER_MILE: f64 = 1609.344;

/// Compute `[min_lon, min_lat, max_lon, max_lat]` over every coordinate of
/// every route geometry across all agencies, expanded by
/// [`BOUNDS_BUFFER_MILES`].
///
/// Stop coordinates are deliberately excluded; the viewport tracks where
/// vehicles run, not every outlying stop record. The buffer is applied as a
/// geodesic offset from the envelope's edge midpoints, so the margin is
/// approximately constant ground distance at any latitude.
///
/// Zero input coordinates is an error; a numeric placeholder is never
/// returned.
pub fn compute_bounds(route_collections: &[FeatureCollection]) -> Result<[f64; 4], ExportError> {
    let mut envelope: Option<[f64; 4]> = None;
    for collection in route_collections {
        for feature in &collection.features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            if let Value::MultiLineString(lines) = &geometry.value {
                for position in lines.iter().flatten() {
                    if let [lon, lat, ..] = position.as_slice() {
                        envelope = Some(extend(envelope, *lon, *lat));
                    }
                }
            }
        }
    }

    let [min_lon, min_lat, max_lon, max_lat] = envelope.ok_or(ExportError::EmptyBounds)?;
    Ok(buffer_envelope(
        min_lon,
        min_lat,
        max_lon,
        max_lat,
        BOUNDS_BUFFER_MILES * METERS_PER_MILE,
    ))
}

fn extend(envelope: Option<[f64; 4]>, lon: f64, lat: f64) -> [f64; 4] {
    match envelope {
        None => [lon, lat, lon, lat],
        Some([min_lon, min_lat, max_lon, max_lat]) => [
            min_lon.min(lon),
            min_lat.min(lat),
            max_lon.max(lon),
            max_lat.max(lat),
        ],
    }
}

/// Push each edge of the envelope outward by `distance_meters`, measured
/// along the ground from the edge's midpoint.
fn buffer_envelope(
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    distance_meters: f64,
) -> [f64; 4] {
    let mid_lat = (min_lat + max_lat) / 2.0;
    let mid_lon = (min_lon + max_lon) / 2.0;

    let west = Point::new(min_lon, mid_lat).haversine_destination(270.0, distance_meters);
    let east = Point::new(max_lon, mid_lat).haversine_destination(90.0, distance_meters);
    let south = Point::new(mid_lon, min_lat).haversine_destination(180.0, distance_meters);
    let north = Point::new(mid_lon, max_lat).haversine_destination(0.0, distance_meters);

    [west.x(), south.y(), east.x(), north.y()]
}

#[cfg(test)]
mod tests {
    use geojson::{Feature, Geometry};

    use super::*;

    fn routes_collection(lines: Vec<Vec<Vec<f64>>>) -> FeatureCollection {
        let features = lines
            .into_iter()
            .map(|line| Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::MultiLineString(vec![line]))),
                id: None,
                properties: None,
                foreign_members: None,
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[test]
    fn empty_input_is_an_error_not_a_placeholder() {
        let err = compute_bounds(&[]).expect_err("no coordinates");
        assert!(matches!(err, ExportError::EmptyBounds));

        let empty = routes_collection(vec![]);
        let err = compute_bounds(&[empty]).expect_err("no coordinates");
        assert!(matches!(err, ExportError::EmptyBounds));
    }

    #[test]
    fn routes_with_empty_geometry_do_not_contribute() {
        let collection = FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::MultiLineString(Vec::new()))),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        };
        assert!(matches!(
            compute_bounds(&[collection]),
            Err(ExportError::EmptyBounds)
        ));
    }

    #[test]
    fn bounds_strictly_contain_the_raw_envelope() {
        let collection = routes_collection(vec![vec![
            vec![20.0, 10.0],
            vec![21.0, 11.0],
        ]]);
        let [min_lon, min_lat, max_lon, max_lat] =
            compute_bounds(&[collection]).expect("bounds");
        assert!(min_lon < 20.0);
        assert!(min_lat < 10.0);
        assert!(max_lon > 21.0);
        assert!(max_lat > 11.0);
    }

    #[test]
    fn margin_is_roughly_five_miles_at_mid_latitude() {
        let collection = routes_collection(vec![vec![
            vec![-122.5, 45.0],
            vec![-122.0, 45.5],
        ]]);
        let [min_lon, min_lat, max_lon, max_lat] =
            compute_bounds(&[collection]).expect("bounds");

        let buffer_meters = BOUNDS_BUFFER_MILES * METERS_PER_MILE;
        let meters_per_degree_lat = 111_132.0;
        let mid_lat: f64 = (45.0 + 45.5) / 2.0;
        let meters_per_degree_lon = 111_320.0 * mid_lat.to_radians().cos();

        let south_margin = (45.0 - min_lat) * meters_per_degree_lat;
        let north_margin = (max_lat - 45.5) * meters_per_degree_lat;
        let west_margin = (-122.5 - min_lon) * meters_per_degree_lon;
        let east_margin = (max_lon - -122.0) * meters_per_degree_lon;

        for margin in [south_margin, north_margin, west_margin, east_margin] {
            let ratio = margin / buffer_meters;
            assert!(
                (0.95..=1.05).contains(&ratio),
                "margin {margin} not within 5% of {buffer_meters}"
            );
        }
    }

    #[test]
    fn aggregates_across_multiple_agency_collections() {
        let first = routes_collection(vec![vec![vec![20.0, 10.0]]]);
        let second = routes_collection(vec![vec![vec![30.0, 15.0]]]);
        let [min_lon, min_lat, max_lon, max_lat] =
            compute_bounds(&[first, second]).expect("bounds");
        assert!(min_lon < 20.0 && max_lon > 30.0);
        assert!(min_lat < 10.0 && max_lat > 15.0);
    }
}
