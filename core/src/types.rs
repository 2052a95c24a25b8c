//! Shared primitive types used across the entire simulation.

/// A simulation day. Day 1 is the first simulated day of a run.
pub type Day = i64;

/// Stable identifier of a farm in the catalog.
pub type FarmId = String;

/// The canonical run identifier.
pub type RunId = String;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Coarse degrees-to-kilometres factor used for planar route distances.
pub const KM_PER_DEGREE: f64 = 111.0;

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance in km: euclidean norm over (lat, lon) scaled by
    /// `KM_PER_DEGREE`. Not a geodesic.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE
    }

    /// Linear interpolation in coordinate space, `t` in [0, 1].
    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }
}

/// Round to 2 decimal places, as every externally reported money or
/// weight figure is.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
