//! # Obfuscation Cache
//!
//! Obfuscated points keyed by `(viewer, resource)`. An entry is drawn once
//! and then reused until it is older than the TTL, is invalidated, or no
//! longer lies near the resource's current coordinate.
//!
//! Creation happens under a single write lock: concurrent first views of
//! the same pair see one draw, not several.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use trustgate_core::{GeoCoordinate, ResourceId, Timestamp, ViewerId};

use crate::error::GeoError;

/// Cache key: who is looking at what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKey {
    /// Viewer the point was drawn for.
    pub viewer_id: ViewerId,
    /// Resource the point stands in for.
    pub resource_id: ResourceId,
}

impl CacheKey {
    pub fn new(viewer_id: ViewerId, resource_id: ResourceId) -> Self {
        Self {
            viewer_id,
            resource_id,
        }
    }
}

/// A drawn point and when it was drawn. Serializes as
/// `{ "lat": .., "lng": .., "createdAt": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObfuscationEntry {
    #[serde(flatten)]
    pub coordinate: GeoCoordinate,
    pub created_at: Timestamp,
}

impl ObfuscationEntry {
    /// Whether the entry has lived past `ttl` at `now`.
    pub fn is_expired(&self, ttl: Duration, now: Timestamp) -> bool {
        now >= self.created_at.plus(ttl)
    }
}

/// Shared obfuscation cache handle.
#[derive(Debug, Clone)]
pub struct ObfuscationCache {
    entries: Arc<RwLock<HashMap<CacheKey, ObfuscationEntry>>>,
    ttl: Duration,
}

impl ObfuscationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry.
    ///
    /// `Ok(None)` means nothing was ever drawn (or it was invalidated).
    ///
    /// # Errors
    ///
    /// [`GeoError::StaleObfuscationCache`] if the entry outlived the TTL.
    /// The stale entry is left in place; the next get-or-create replaces it.
    pub fn lookup(&self, key: CacheKey, now: Timestamp) -> Result<Option<ObfuscationEntry>, GeoError> {
        match self.entries.read().get(&key) {
            None => Ok(None),
            Some(entry) if entry.is_expired(self.ttl, now) => Err(GeoError::StaleObfuscationCache {
                viewer: key.viewer_id,
                resource: key.resource_id,
                created_at: entry.created_at,
            }),
            Some(entry) => Ok(Some(*entry)),
        }
    }

    /// Return the live entry for `key`, or store and return one built from
    /// `draw`. An unexpired entry whose point fails `covers` (the resource
    /// moved since it was drawn) is replaced. `draw` runs at most once,
    /// under the write lock.
    pub(crate) fn get_or_insert_with<C, F>(
        &self,
        key: CacheKey,
        now: Timestamp,
        covers: C,
        draw: F,
    ) -> ObfuscationEntry
    where
        C: Fn(&GeoCoordinate) -> bool,
        F: FnOnce() -> GeoCoordinate,
    {
        match self.lookup(key, now) {
            Ok(Some(entry)) if covers(&entry.coordinate) => {
                tracing::debug!(viewer = %key.viewer_id, resource = %key.resource_id, "obfuscation cache hit");
                return entry;
            }
            Ok(Some(_)) => tracing::warn!(
                viewer = %key.viewer_id,
                resource = %key.resource_id,
                "cached obfuscated point no longer covers resource, redrawing"
            ),
            Ok(None) => {}
            Err(stale) => tracing::warn!(error = %stale, "regenerating obfuscated coordinate"),
        }

        let mut guard = self.entries.write();
        // Another writer may have filled the slot between the read and the write.
        if let Some(entry) = guard.get(&key) {
            if !entry.is_expired(self.ttl, now) && covers(&entry.coordinate) {
                tracing::debug!(viewer = %key.viewer_id, resource = %key.resource_id, "obfuscation cache hit");
                return *entry;
            }
        }
        let entry = ObfuscationEntry {
            coordinate: draw(),
            created_at: now,
        };
        guard.insert(key, entry);
        tracing::debug!(viewer = %key.viewer_id, resource = %key.resource_id, "obfuscation cache miss, drew new offset");
        entry
    }

    /// Drop one entry. Returns whether anything was removed.
    pub fn invalidate(&self, viewer: ViewerId, resource: ResourceId) -> bool {
        self.entries.write().remove(&CacheKey::new(viewer, resource)).is_some()
    }

    /// Drop every entry drawn for `viewer`, e.g. on logout.
    pub fn invalidate_viewer(&self, viewer: ViewerId) -> usize {
        self.retain_counting(|key, _| key.viewer_id != viewer)
    }

    /// Drop every entry for `resource`, e.g. after the resource moved.
    pub fn invalidate_resource(&self, resource: ResourceId) -> usize {
        self.retain_counting(|key, _| key.resource_id != resource)
    }

    /// Drop entries expired at `now`.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let ttl = self.ttl;
        let removed = self.retain_counting(|_, entry| !entry.is_expired(ttl, now));
        if removed > 0 {
            tracing::debug!(removed, "purged expired obfuscation entries");
        }
        removed
    }

    /// Number of entries, live or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out all entries for persistence.
    pub fn snapshot(&self) -> Vec<(CacheKey, ObfuscationEntry)> {
        self.entries.read().iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Load persisted entries, replacing any with the same key. Expired
    /// entries are accepted and regenerated on next view.
    pub fn restore(&self, entries: impl IntoIterator<Item = (CacheKey, ObfuscationEntry)>) {
        self.entries.write().extend(entries);
    }

    fn retain_counting<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&CacheKey, &ObfuscationEntry) -> bool,
    {
        let mut guard = self.entries.write();
        let before = guard.len();
        guard.retain(|k, v| keep(k, v));
        before - guard.len()
    }
}
