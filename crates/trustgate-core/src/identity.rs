//! # Identifier Newtypes
//!
//! Newtype wrappers for every identifier the trust gate handles. These
//! prevent identifier confusion: an `EscrowId` cannot be passed where a
//! `ResourceId` is expected, and a cache keyed by `(ViewerId, ResourceId)`
//! cannot be queried with the arguments swapped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an actor's identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityId(Uuid);

/// Unique identifier for an escrow-protected transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EscrowId(Uuid);

/// Unique identifier for a protected resource (listing, property, item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

/// The party on the receiving end of an escrow (landlord, seller, agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CounterpartyId(Uuid);

/// Whoever is looking at a resource.
///
/// Authenticated viewers are keyed by their identity. Guests have no
/// identity, so the host issues them an opaque per-visit id; that id scopes
/// the guest's obfuscation cache entries to the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewerId(Uuid);

macro_rules! uuid_newtype {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_newtype!(IdentityId, "identity");
uuid_newtype!(EscrowId, "escrow");
uuid_newtype!(ResourceId, "resource");
uuid_newtype!(CounterpartyId, "counterparty");
uuid_newtype!(ViewerId, "viewer");

impl From<IdentityId> for ViewerId {
    /// An authenticated viewer is identified by their identity.
    fn from(id: IdentityId) -> Self {
        Self(id.0)
    }
}
