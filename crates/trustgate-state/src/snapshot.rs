//! # Persisted Session Layout
//!
//! ```json
//! { "identityId": "…", "activeRole": "landlord", "unlockedRoles": ["consumer", "landlord"] }
//! ```
//!
//! Stored under [`SESSION_STORAGE_KEY`]. Restoring re-checks every session
//! invariant, so a tampered or truncated snapshot is rejected rather than
//! producing a session that could act as a persona it never unlocked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use trustgate_core::{ActiveRole, IdentityId, Persona};

use crate::error::PersonaError;
use crate::session::Session;

/// Namespaced storage key for the persisted session.
pub const SESSION_STORAGE_KEY: &str = "trustgate:session:v1";

/// Wire form of a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Authenticated identity, absent for guests.
    pub identity_id: Option<IdentityId>,
    /// Active role name.
    pub active_role: ActiveRole,
    /// Unlocked personas in catalog order.
    pub unlocked_roles: Vec<Persona>,
}

impl Session {
    /// Convert to the persisted layout.
    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            identity_id: self.identity(),
            active_role: self.active_role(),
            unlocked_roles: self.unlocked_roles().iter().copied().collect(),
        }
    }

    /// Restore from the persisted layout.
    ///
    /// Duplicate entries in `unlocked_roles` are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`PersonaError::CorruptSnapshot`] if the snapshot violates a
    /// session invariant.
    pub fn from_persisted(snapshot: &PersistedSession) -> Result<Self, PersonaError> {
        let unlocked: BTreeSet<Persona> = snapshot.unlocked_roles.iter().copied().collect();
        Session::from_parts(snapshot.identity_id, snapshot.active_role, unlocked)
    }
}
