//! # Geo Error Types

use thiserror::Error;

use trustgate_core::{ResourceId, Timestamp, ViewerId};

/// Errors arising from location resolution.
#[derive(Error, Debug)]
pub enum GeoError {
    /// The resource has no coordinate. Nothing is fabricated.
    #[error("location unavailable for {resource}")]
    LocationUnavailable {
        /// The resource that was asked about.
        resource: ResourceId,
    },

    /// A cache entry outlived its TTL. Internal signal: the cache answers it
    /// with exactly one fresh draw.
    #[error("obfuscation cache entry for {viewer} / {resource} expired (created {created_at})")]
    StaleObfuscationCache {
        /// Cache key viewer.
        viewer: ViewerId,
        /// Cache key resource.
        resource: ResourceId,
        /// When the stale entry was drawn.
        created_at: Timestamp,
    },
}
