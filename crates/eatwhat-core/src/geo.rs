//! Great-circle distance on a spherical Earth.
//!
//! Uses the spherical law of cosines. The cosine term is clamped to
//! `[-1, 1]` before `acos` so rounding overshoot on identical or antipodal
//! points cannot produce `NaN`.

use crate::candidates::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometres between two points.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlng = (b.lng - a.lng).to_radians();
    let cos_angle = lat1.cos() * lat2.cos() * dlng.cos() + lat1.sin() * lat2.sin();
    EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
}

/// Distance in metres between two points.
#[must_use]
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    distance_km(a, b) * 1000.0
}

/// Moves `origin` due north by `km` kilometres. Handy for building fixtures
/// at a known distance.
#[must_use]
pub fn offset_north_km(origin: GeoPoint, km: f64) -> GeoPoint {
    let dlat = (km / EARTH_RADIUS_KM).to_degrees();
    GeoPoint::new(origin.lat + dlat, origin.lng)
}
