use crate::models::{BoundingBox, Coordinate};
use thiserror::Error;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors raised for coordinates that cannot be used in distance math
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("coordinate is not a finite number: ({0}, {1})")]
    NotFinite(f64, f64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Check that a latitude/longitude pair is usable
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), GeoError> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(GeoError::NotFinite(latitude, longitude));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoError::LatitudeOutOfRange(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoError::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

/// Calculate the Haversine distance between two points in kilometers
///
/// Both points are validated first; an invalid coordinate is reported
/// instead of producing a NaN distance.
pub fn distance_km(a: Coordinate, b: Coordinate) -> Result<f64, GeoError> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude))
}

/// Raw haversine on degrees, no validation
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Render a distance for display, rounded to one decimal place
pub fn display_distance(distance_km: f64) -> String {
    format!("{:.1} km", distance_km)
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, used to drop far-away shops before ranking.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(center: Coordinate, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;

    // Near the poles this grows without bound, which simply admits every longitude
    let lon_delta = radius_km / (111.0 * center.latitude.to_radians().cos().abs());

    let (min_lon, max_lon) = (center.longitude - lon_delta, center.longitude + lon_delta);

    // A box crossing the antimeridian would need two ranges; admit every longitude instead
    let (min_lon, max_lon) = if min_lon < -180.0 || max_lon > 180.0 {
        (-180.0, 180.0)
    } else {
        (min_lon, max_lon)
    };

    BoundingBox {
        min_lat: center.latitude - lat_delta,
        max_lat: center.latitude + lat_delta,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: Coordinate, bbox: &BoundingBox) -> bool {
    point.latitude >= bbox.min_lat
        && point.latitude <= bbox.max_lat
        && point.longitude >= bbox.min_lon
        && point.longitude <= bbox.max_lon
}
