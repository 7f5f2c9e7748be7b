//! # trustgate-geo — Location Privacy
//!
//! Withholds a resource's precise coordinate until the gate grants it.
//!
//! - **Cache** ([`cache`]): obfuscated points keyed by `(viewer, resource)`.
//!   One random draw per entry, reused until the TTL lapses or the entry is
//!   invalidated.
//!
//! - **Obfuscator** ([`obfuscator`]): turns a true coordinate and a
//!   precise-location decision into a [`MapView`].
//!
//! - **View** ([`view`]): the `{ coordinate, zoomCeiling, markerVisible }`
//!   triple handed to the map renderer.
//!
//! ## Stability
//!
//! Sampling a fresh offset on every view would let an observer average the
//! samples back to the true point. The cache exists to prevent that: a
//! viewer sees the same obfuscated point for a resource until the entry
//! expires.

pub mod cache;
pub mod error;
pub mod obfuscator;
pub mod view;

pub use cache::{CacheKey, ObfuscationCache, ObfuscationEntry};
pub use error::GeoError;
pub use obfuscator::GeoPrivacyObfuscator;
pub use view::{LocationPrecision, MapView};
