use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ScalarParseError {
    #[error("invalid coordinate: {0:?}")]
    InvalidCoordinate(String),
    #[error("invalid sequence number: {0:?}")]
    InvalidSequence(String),
}

/// Parse a latitude or longitude field. GTFS carries coordinates as decimal
/// degrees; non-numeric or non-finite values are rejected.
pub fn parse_coordinate(value: &str) -> Result<f64, ScalarParseError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| ScalarParseError::InvalidCoordinate(value.to_string()))?;
    if !parsed.is_finite() {
        return Err(ScalarParseError::InvalidCoordinate(value.to_string()));
    }
    Ok(parsed)
}

/// Parse a `shape_pt_sequence` field. Sequence numbers are non-negative
/// integers defining the point order within one shape.
pub fn parse_sequence(value: &str) -> Result<u32, ScalarParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| ScalarParseError::InvalidSequence(value.to_string()))
}

/// A `stops.txt` row. Coordinates stay raw here so that a malformed value can
/// be reported against the stop id when geometry is built.
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_lat: String,
    pub stop_lon: String,
    /// Every source column, verbatim, for feature properties.
    pub fields: BTreeMap<String, String>,
}

/// A `routes.txt` row.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub route_id: String,
    pub fields: BTreeMap<String, String>,
}

/// A `trips.txt` row, linking a route to the shape it traverses.
#[derive(Debug, Clone, Serialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub shape_id: Option<String>,
    pub fields: BTreeMap<String, String>,
}

/// A `shapes.txt` row: one point of one shape's polyline.
#[derive(Debug, Clone, Serialize)]
pub struct ShapePoint {
    pub shape_id: String,
    pub sequence: u32,
    pub lat: f64,
    pub lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_coordinates() {
        assert_eq!(parse_coordinate("45.5").unwrap(), 45.5);
        assert_eq!(parse_coordinate(" -122.67 ").unwrap(), -122.67);
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        assert!(parse_coordinate("north").is_err());
        assert!(parse_coordinate("").is_err());
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!(parse_coordinate("NaN").is_err());
        assert!(parse_coordinate("inf").is_err());
    }

    #[test]
    fn parses_sequence_numbers() {
        assert_eq!(parse_sequence("0").unwrap(), 0);
        assert_eq!(parse_sequence("10001").unwrap(), 10001);
        assert!(parse_sequence("-1").is_err());
        assert!(parse_sequence("1.5").is_err());
    }
}
