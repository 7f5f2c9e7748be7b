//! # Map View
//!
//! What the map renderer receives. When `marker_visible` is false the
//! coordinate is always an obfuscated one; the true point never leaves the
//! obfuscator in that case.

use serde::{Deserialize, Serialize};

use trustgate_core::GeoCoordinate;

/// How much location precision a view carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPrecision {
    /// The resource's true coordinate.
    Exact,
    /// A cached, randomly offset coordinate.
    Approximate,
}

/// Renderer input for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Point to centre on.
    pub coordinate: GeoCoordinate,
    /// Highest zoom level the renderer may use.
    pub zoom_ceiling: u8,
    /// Whether to draw a precise pin. Otherwise draw an area indicator.
    pub marker_visible: bool,
    /// Exact or approximate.
    pub precision: LocationPrecision,
}

impl MapView {
    /// The zoom to render at for a caller's `requested` zoom.
    pub fn zoom_for(&self, requested: u8) -> u8 {
        requested.min(self.zoom_ceiling)
    }

    /// Whether this view carries the true coordinate.
    pub fn is_exact(&self) -> bool {
        self.precision == LocationPrecision::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(ceiling: u8) -> MapView {
        MapView {
            coordinate: GeoCoordinate::new(9.8862, 8.8884).unwrap(),
            zoom_ceiling: ceiling,
            marker_visible: false,
            precision: LocationPrecision::Approximate,
        }
    }

    #[test]
    fn zoom_is_capped() {
        let v = view(14);
        assert_eq!(v.zoom_for(18), 14);
        assert_eq!(v.zoom_for(10), 10);
        assert_eq!(v.zoom_for(u8::MAX), 14);
    }

    #[test]
    fn wire_form() {
        let json = serde_json::to_value(view(14)).unwrap();
        assert_eq!(json["zoomCeiling"], 14);
        assert_eq!(json["markerVisible"], false);
        assert_eq!(json["precision"], "approximate");
        assert_eq!(json["coordinate"]["lat"], 9.8862);
    }
}
