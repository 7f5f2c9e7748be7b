//! # WGS-84 Coordinates
//!
//! A resource owns exactly one true [`GeoCoordinate`]. Obfuscated points are
//! derived from it by the geo crate and are never stored as authoritative.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A point in WGS-84 degrees.
///
/// Construction rejects non-finite values and values outside
/// `lat ∈ [-90, 90]`, `lng ∈ [-180, 180]`. Deserialization goes through the
/// same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct GeoCoordinate {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinate> for GeoCoordinate {
    type Error = CoreError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoCoordinate {
    /// Minimum latitude.
    pub const MIN_LAT: f64 = -90.0;
    /// Maximum latitude.
    pub const MAX_LAT: f64 = 90.0;
    /// Minimum longitude.
    pub const MIN_LNG: f64 = -180.0;
    /// Maximum longitude.
    pub const MAX_LNG: f64 = 180.0;

    /// Create a validated coordinate.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !(Self::MIN_LAT..=Self::MAX_LAT).contains(&lat) {
            return Err(CoreError::InvalidCoordinate {
                axis: "lat",
                value: lat,
            });
        }
        if !lng.is_finite() || !(Self::MIN_LNG..=Self::MAX_LNG).contains(&lng) {
            return Err(CoreError::InvalidCoordinate {
                axis: "lng",
                value: lng,
            });
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Shift by `(d_lat, d_lng)` degrees. A shift that would leave the valid
    /// range is reflected back off the boundary, so the distance from `self`
    /// never exceeds the requested offset and points near a pole or the
    /// antimeridian do not collapse onto the edge.
    pub fn offset_reflected(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            lat: reflect(self.lat + d_lat, Self::MIN_LAT, Self::MAX_LAT),
            lng: reflect(self.lng + d_lng, Self::MIN_LNG, Self::MAX_LNG),
        }
    }

    /// Whether `other` lies within `max_offset` degrees on both axes.
    pub fn within_box(&self, other: &GeoCoordinate, max_offset: f64) -> bool {
        (self.lat - other.lat).abs() <= max_offset && (self.lng - other.lng).abs() <= max_offset
    }

    /// Bitwise equality on both axes.
    pub fn bit_eq(&self, other: &GeoCoordinate) -> bool {
        self.lat.to_bits() == other.lat.to_bits() && self.lng.to_bits() == other.lng.to_bits()
    }
}

fn reflect(value: f64, min: f64, max: f64) -> f64 {
    let folded = if value > max {
        2.0 * max - value
    } else if value < min {
        2.0 * min - value
    } else {
        value
    };
    // Offsets are far smaller than the range, so one fold suffices.
    folded.clamp(min, max)
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_coordinate_accepted() {
        let c = GeoCoordinate::new(9.8862, 8.8884).unwrap();
        assert_eq!(c.lat(), 9.8862);
        assert_eq!(c.lng(), 8.8884);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(GeoCoordinate::new(90.5, 0.0).is_err());
        assert!(GeoCoordinate::new(0.0, -180.1).is_err());
        assert!(GeoCoordinate::new(f64::NAN, 0.0).is_err());
        assert!(GeoCoordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn offset_reflects_at_poles() {
        let c = GeoCoordinate::new(89.999, 179.999).unwrap();
        let shifted = c.offset_reflected(0.005, 0.005);
        assert!((shifted.lat() - 89.996).abs() < 1e-9);
        assert!((shifted.lng() - 179.996).abs() < 1e-9);
        assert!(c.within_box(&shifted, 0.005));

        let south = GeoCoordinate::new(-90.0, -180.0).unwrap();
        let shifted = south.offset_reflected(-0.002, -0.003);
        assert!((shifted.lat() - -89.998).abs() < 1e-9);
        assert!((shifted.lng() - -179.997).abs() < 1e-9);
    }

    #[test]
    fn pole_offsets_do_not_collapse_to_edge() {
        let pole = GeoCoordinate::new(90.0, 0.0).unwrap();
        for d in [0.001, 0.002, 0.004] {
            assert!(pole.offset_reflected(d, 0.0).lat() < 90.0);
            assert!(pole.offset_reflected(-d, 0.0).lat() < 90.0);
        }
    }

    #[test]
    fn offset_inside_range_is_plain_shift() {
        let c = GeoCoordinate::new(9.8862, 8.8884).unwrap();
        let shifted = c.offset_reflected(0.001, -0.002);
        assert_eq!(shifted.lat(), 9.8862 + 0.001);
        assert_eq!(shifted.lng(), 8.8884 - 0.002);
    }

    #[test]
    fn within_box_is_inclusive_per_axis() {
        let a = GeoCoordinate::new(0.0, 0.0).unwrap();
        let b = GeoCoordinate::new(0.004, -0.004).unwrap();
        let far = GeoCoordinate::new(0.0, 0.01).unwrap();
        assert!(a.within_box(&b, 0.005));
        assert!(!a.within_box(&far, 0.005));
    }

    #[test]
    fn deserialization_validates() {
        let ok: GeoCoordinate = serde_json::from_str(r#"{"lat":9.8862,"lng":8.8884}"#).unwrap();
        assert_eq!(ok.lat(), 9.8862);
        assert!(serde_json::from_str::<GeoCoordinate>(r#"{"lat":120.0,"lng":0.0}"#).is_err());
    }
}
