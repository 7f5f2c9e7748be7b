//! # Geo Privacy Obfuscator
//!
//! Turns a resource's true coordinate into a [`MapView`]. With precise
//! access the true point is returned at full zoom with a visible marker.
//! Without it the viewer gets a cached point offset uniformly within
//! `±max_offset_degrees` per axis, a capped zoom, and no marker.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use trustgate_core::{ConfigError, GeoConfig, GeoCoordinate, ResourceId, Timestamp, ViewerId};

use crate::cache::{CacheKey, ObfuscationCache};
use crate::error::GeoError;
use crate::view::{LocationPrecision, MapView};

const DRAW_MARGIN: f64 = 1e-9;

/// Location obfuscator. Cloning shares the cache and the RNG.
#[derive(Debug, Clone)]
pub struct GeoPrivacyObfuscator {
    config: GeoConfig,
    cache: ObfuscationCache,
    rng: Arc<Mutex<StdRng>>,
}

impl GeoPrivacyObfuscator {
    /// Build an obfuscator seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: GeoConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build an obfuscator with a deterministic seed.
    pub fn with_seed(config: GeoConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Build an obfuscator drawing from `rng`.
    pub fn with_rng(config: GeoConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = ObfuscationCache::new(config.cache_ttl());
        Ok(Self {
            config,
            cache,
            rng: Arc::new(Mutex::new(rng)),
        })
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    /// The backing cache, for invalidation and persistence.
    pub fn cache(&self) -> &ObfuscationCache {
        &self.cache
    }

    /// Resolve what `viewer` may see of `resource`.
    ///
    /// # Errors
    ///
    /// [`GeoError::LocationUnavailable`] when `coordinate` is `None`.
    pub fn obfuscate(
        &self,
        viewer: ViewerId,
        resource: ResourceId,
        coordinate: Option<GeoCoordinate>,
        precise: bool,
        now: Timestamp,
    ) -> Result<MapView, GeoError> {
        let Some(truth) = coordinate else {
            tracing::debug!(%resource, "resource has no coordinate");
            return Err(GeoError::LocationUnavailable { resource });
        };

        if precise {
            return Ok(MapView {
                coordinate: truth,
                zoom_ceiling: self.config.precise_zoom_ceiling,
                marker_visible: true,
                precision: LocationPrecision::Exact,
            });
        }

        let key = CacheKey::new(viewer, resource);
        let max = self.config.max_offset_degrees;
        let entry = self.cache.get_or_insert_with(
            key,
            now,
            |point| point.within_box(&truth, max),
            || self.draw(&truth),
        );
        Ok(MapView {
            coordinate: entry.coordinate,
            zoom_ceiling: self.config.obfuscated_zoom_ceiling,
            marker_visible: false,
            precision: LocationPrecision::Approximate,
        })
    }

    fn draw(&self, truth: &GeoCoordinate) -> GeoCoordinate {
        // Shrink the range by a margin well above f64 rounding at 180° so
        // the shifted point always passes `within_box` against `truth`.
        let max = self.config.max_offset_degrees * (1.0 - DRAW_MARGIN);
        let mut rng = self.rng.lock();
        let d_lat = rng.gen_range(-max..=max);
        let d_lng = rng.gen_range(-max..=max);
        truth.offset_reflected(d_lat, d_lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    const JOS: (f64, f64) = (9.8862, 8.8884);

    fn jos() -> GeoCoordinate {
        GeoCoordinate::new(JOS.0, JOS.1).unwrap()
    }

    fn obfuscator() -> GeoPrivacyObfuscator {
        GeoPrivacyObfuscator::with_seed(GeoConfig::default(), 7).unwrap()
    }

    #[test]
    fn precise_access_returns_truth() {
        let view = obfuscator()
            .obfuscate(ViewerId::new(), ResourceId::new(), Some(jos()), true, Timestamp::now())
            .unwrap();
        assert!(view.coordinate.bit_eq(&jos()));
        assert_eq!(view.zoom_ceiling, 20);
        assert!(view.marker_visible);
        assert!(view.is_exact());
    }

    #[test]
    fn precise_access_leaves_cache_alone() {
        let o = obfuscator();
        o.obfuscate(ViewerId::new(), ResourceId::new(), Some(jos()), true, Timestamp::now())
            .unwrap();
        assert!(o.cache().is_empty());
    }

    #[test]
    fn obfuscated_view_is_stable_and_bounded() {
        let o = obfuscator();
        let viewer = ViewerId::new();
        let resource = ResourceId::new();
        let now = Timestamp::now();

        let first = o.obfuscate(viewer, resource, Some(jos()), false, now).unwrap();
        let second = o
            .obfuscate(viewer, resource, Some(jos()), false, now.plus(Duration::hours(1)))
            .unwrap();

        assert!(first.coordinate.bit_eq(&second.coordinate));
        assert!(!first.coordinate.bit_eq(&jos()));
        assert!(first.coordinate.within_box(&jos(), 0.005));
        assert_eq!(first.zoom_ceiling, 14);
        assert_eq!(first.zoom_for(18), 14);
        assert!(!first.marker_visible);
    }

    #[test]
    fn each_viewer_gets_own_draw() {
        let o = obfuscator();
        let resource = ResourceId::new();
        let now = Timestamp::now();
        let a = o.obfuscate(ViewerId::new(), resource, Some(jos()), false, now).unwrap();
        let b = o.obfuscate(ViewerId::new(), resource, Some(jos()), false, now).unwrap();
        assert!(!a.coordinate.bit_eq(&b.coordinate));
        assert_eq!(o.cache().len(), 2);
    }

    #[test]
    fn expiry_triggers_single_regeneration() {
        let config = GeoConfig {
            cache_ttl_seconds: 60,
            ..GeoConfig::default()
        };
        let o = GeoPrivacyObfuscator::with_seed(config, 11).unwrap();
        let viewer = ViewerId::new();
        let resource = ResourceId::new();
        let t0 = Timestamp::now();

        let first = o.obfuscate(viewer, resource, Some(jos()), false, t0).unwrap();
        let t1 = t0.plus(Duration::seconds(61));
        let second = o.obfuscate(viewer, resource, Some(jos()), false, t1).unwrap();
        let third = o
            .obfuscate(viewer, resource, Some(jos()), false, t1.plus(Duration::seconds(1)))
            .unwrap();

        assert!(!first.coordinate.bit_eq(&second.coordinate));
        assert!(second.coordinate.bit_eq(&third.coordinate));
    }

    #[test]
    fn invalidation_forces_new_draw() {
        let o = obfuscator();
        let viewer = ViewerId::new();
        let resource = ResourceId::new();
        let now = Timestamp::now();
        let first = o.obfuscate(viewer, resource, Some(jos()), false, now).unwrap();
        assert!(o.cache().invalidate(viewer, resource));
        let second = o.obfuscate(viewer, resource, Some(jos()), false, now).unwrap();
        assert!(!first.coordinate.bit_eq(&second.coordinate));
    }

    #[test]
    fn moved_resource_gets_point_near_new_location() {
        let o = obfuscator();
        let viewer = ViewerId::new();
        let resource = ResourceId::new();
        let now = Timestamp::now();
        let lagos = GeoCoordinate::new(6.5244, 3.3792).unwrap();

        let before = o.obfuscate(viewer, resource, Some(jos()), false, now).unwrap();
        assert!(before.coordinate.within_box(&jos(), 0.005));

        let after = o.obfuscate(viewer, resource, Some(lagos), false, now).unwrap();
        assert!(after.coordinate.within_box(&lagos, 0.005));
        let again = o.obfuscate(viewer, resource, Some(lagos), false, now).unwrap();
        assert!(after.coordinate.bit_eq(&again.coordinate));
        assert_eq!(o.cache().len(), 1);
    }

    #[test]
    fn small_move_inside_box_keeps_point() {
        let o = obfuscator();
        let viewer = ViewerId::new();
        let resource = ResourceId::new();
        let now = Timestamp::now();
        let first = o.obfuscate(viewer, resource, Some(jos()), false, now).unwrap();
        let nudged = GeoCoordinate::new(first.coordinate.lat(), first.coordinate.lng()).unwrap();
        let second = o.obfuscate(viewer, resource, Some(nudged), false, now).unwrap();
        assert!(first.coordinate.bit_eq(&second.coordinate));
    }

    #[test]
    fn missing_coordinate_is_unavailable() {
        let resource = ResourceId::new();
        let err = obfuscator()
            .obfuscate(ViewerId::new(), resource, None, false, Timestamp::now())
            .unwrap_err();
        assert!(matches!(err, GeoError::LocationUnavailable { resource: r } if r == resource));
    }

    #[test]
    fn pole_points_stay_in_range_and_off_the_edge() {
        let pole = GeoCoordinate::new(90.0, 180.0).unwrap();
        let o = obfuscator();
        let mut on_edge = 0;
        for _ in 0..32 {
            let view = o
                .obfuscate(ViewerId::new(), ResourceId::new(), Some(pole), false, Timestamp::now())
                .unwrap();
            assert!(view.coordinate.lat() <= 90.0);
            assert!(view.coordinate.lng() <= 180.0);
            assert!(view.coordinate.within_box(&pole, 0.005));
            if view.coordinate.lat() == 90.0 {
                on_edge += 1;
            }
        }
        assert_eq!(on_edge, 0);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = GeoConfig {
            max_offset_degrees: 0.0,
            ..GeoConfig::default()
        };
        assert!(GeoPrivacyObfuscator::new(config).is_err());
    }

    #[test]
    fn concurrent_first_views_share_one_draw() {
        let o = obfuscator();
        let viewer = ViewerId::new();
        let resource = ResourceId::new();
        let now = Timestamp::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let o = o.clone();
                std::thread::spawn(move || {
                    o.obfuscate(viewer, resource, Some(jos()), false, now)
                        .unwrap()
                        .coordinate
                })
            })
            .collect();
        let points: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(points.windows(2).all(|w| w[0].bit_eq(&w[1])));
        assert_eq!(o.cache().len(), 1);
    }

    proptest! {
        #[test]
        fn obfuscated_point_stays_in_box(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
            seed in any::<u64>(),
        ) {
            let truth = GeoCoordinate::new(lat, lng).unwrap();
            let o = GeoPrivacyObfuscator::with_seed(GeoConfig::default(), seed).unwrap();
            let view = o
                .obfuscate(ViewerId::new(), ResourceId::new(), Some(truth), false, Timestamp::now())
                .unwrap();
            prop_assert!(view.coordinate.within_box(&truth, 0.005));
            prop_assert!(!view.marker_visible);
            prop_assert_eq!(view.zoom_ceiling, 14);
        }
    }
}
